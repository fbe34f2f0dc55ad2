//! Mapping von UI-Intents auf mutierende App-Commands.

use super::{AppCommand, AppIntent, AppState};

/// Connection-Typ, wenn ein Intent keinen angibt.
const DEFAULT_CONNECTION_TYPE: &str = "connection";

/// Übersetzt einen `AppIntent` in eine Sequenz ausführbarer `AppCommand`s.
pub fn map_intent_to_commands(state: &AppState, intent: AppIntent) -> Vec<AppCommand> {
    match intent {
        AppIntent::SelectRequested { ids, additive } => {
            vec![AppCommand::SelectElements { ids, additive }]
        }
        AppIntent::SelectionCleared => vec![AppCommand::ClearSelection],
        AppIntent::SelectAllRequested => vec![AppCommand::SelectAll],

        AppIntent::ShapeCreateRequested {
            id,
            element_type,
            position,
            size,
            parent,
            host,
        } => vec![AppCommand::CreateShape {
            id,
            element_type,
            position,
            size,
            parent,
            host,
        }],
        AppIntent::LabelCreateRequested {
            target,
            position,
            text,
        } => vec![AppCommand::CreateLabel {
            target,
            position,
            text,
        }],
        AppIntent::ConnectRequested {
            id,
            source,
            target,
            element_type,
        } => vec![AppCommand::CreateConnection {
            id,
            source,
            target,
            element_type: element_type.unwrap_or_else(|| DEFAULT_CONNECTION_TYPE.to_owned()),
        }],

        AppIntent::DragStartRequested { position } => {
            if state.selection.is_empty() {
                return Vec::new();
            }
            vec![AppCommand::BeginMove { position }]
        }
        AppIntent::DragUpdateRequested { position, hover } => {
            if state.drag.is_none() {
                return Vec::new();
            }
            vec![AppCommand::UpdateMove { position, hover }]
        }
        AppIntent::DragEndRequested => {
            if state.drag.is_none() {
                return Vec::new();
            }
            vec![AppCommand::EndMove]
        }
        AppIntent::DragCancelRequested => vec![AppCommand::CancelMove],

        AppIntent::ResizeRequested { shape, bounds } => {
            vec![AppCommand::ResizeShape { shape, bounds }]
        }
        AppIntent::ReplaceRequested {
            shape,
            element_type,
            retain_attachments,
        } => vec![AppCommand::ReplaceShape {
            shape,
            element_type,
            retain_attachments,
        }],
        AppIntent::AttachRequested { shape, host } => {
            vec![AppCommand::UpdateAttachment { shape, host }]
        }
        AppIntent::PropertiesUpdateRequested {
            element,
            properties,
        } => vec![AppCommand::UpdateProperties {
            element,
            properties,
        }],

        AppIntent::DeleteSelectedRequested => {
            if state.selection.is_empty() {
                return Vec::new();
            }
            vec![
                AppCommand::DeleteElements {
                    ids: state.selection.ids(),
                },
                AppCommand::ClearSelection,
            ]
        }
        AppIntent::CopyRequested => {
            if state.selection.is_empty() {
                return Vec::new();
            }
            vec![AppCommand::CopyElements {
                ids: state.selection.ids(),
            }]
        }
        AppIntent::PasteRequested { target, position } => {
            vec![AppCommand::PasteElements { target, position }]
        }
        AppIntent::UndoRequested => with_drag_cancelled(state, AppCommand::Undo),
        AppIntent::RedoRequested => with_drag_cancelled(state, AppCommand::Redo),
    }
}

/// Bricht einen laufenden Drag vor einem Verlaufs-Schritt ab.
fn with_drag_cancelled(state: &AppState, command: AppCommand) -> Vec<AppCommand> {
    if state.drag.is_some() {
        vec![AppCommand::CancelMove, command]
    } else {
        vec![command]
    }
}

#[cfg(test)]
mod tests;
