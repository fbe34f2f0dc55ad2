//! Application Controller für zentrale Event-Verarbeitung.

use super::command_log::UndoStep;
use super::{AppCommand, AppIntent, AppState};

/// Orchestriert Intents und Feature-Handler auf den AppState.
#[derive(Debug, Default)]
pub struct AppController;

impl AppController {
    /// Erstellt einen neuen Controller.
    pub fn new() -> Self {
        Self
    }

    /// Verarbeitet einen Intent über Intent->Command Mapping.
    pub fn handle_intent(&mut self, state: &mut AppState, intent: AppIntent) -> anyhow::Result<()> {
        let commands = self.map_intent_to_commands(state, intent);
        for command in commands {
            self.handle_command(state, command)?;
        }

        Ok(())
    }

    fn map_intent_to_commands(&self, state: &AppState, intent: AppIntent) -> Vec<AppCommand> {
        super::intent_mapping::map_intent_to_commands(state, intent)
    }

    /// Führt mutierende Commands auf dem AppState aus und loggt sie samt
    /// ihrer Undo-Stufe.
    pub fn handle_command(
        &mut self,
        state: &mut AppState,
        command: AppCommand,
    ) -> anyhow::Result<()> {
        let before = state.modeler.command_stack().last_operation_id();
        let result = self.dispatch(state, command.clone());
        let after = state.modeler.command_stack().last_operation_id();

        let step = UndoStep::between(&command, before, after);
        state.command_log.record(command, step, result.is_err());
        result
    }

    /// Dispatcht an Feature-Handler in `handlers/`.
    fn dispatch(&mut self, state: &mut AppState, command: AppCommand) -> anyhow::Result<()> {
        use super::handlers;

        match command {
            // === Selektion ===
            AppCommand::SelectElements { ids, additive } => {
                handlers::selection::select(state, ids, additive)
            }
            AppCommand::ClearSelection => handlers::selection::clear(state),
            AppCommand::SelectAll => handlers::selection::select_all(state),

            // === Erzeugen ===
            AppCommand::CreateShape {
                id,
                element_type,
                position,
                size,
                parent,
                host,
            } => handlers::editing::create_shape(
                state,
                id,
                &element_type,
                position,
                size,
                parent,
                host,
            )?,
            AppCommand::CreateLabel {
                target,
                position,
                text,
            } => handlers::editing::create_label(state, &target, position, text)?,
            AppCommand::CreateConnection {
                id,
                source,
                target,
                element_type,
            } => handlers::editing::create_connection(state, id, &source, &target, &element_type)?,

            // === Drag-Move ===
            AppCommand::BeginMove { position } => handlers::drag::begin(state, position),
            AppCommand::UpdateMove { position, hover } => {
                handlers::drag::update(state, position, hover)
            }
            AppCommand::EndMove => handlers::drag::end(state)?,
            AppCommand::CancelMove => handlers::drag::cancel(state),

            // === Ändern ===
            AppCommand::ResizeShape { shape, bounds } => {
                handlers::editing::resize_shape(state, &shape, bounds)?
            }
            AppCommand::ReplaceShape {
                shape,
                element_type,
                retain_attachments,
            } => handlers::editing::replace_shape(state, &shape, element_type, retain_attachments)?,
            AppCommand::UpdateAttachment { shape, host } => {
                handlers::editing::update_attachment(state, &shape, host.as_ref())?
            }
            AppCommand::UpdateProperties {
                element,
                properties,
            } => handlers::editing::update_properties(state, &element, properties)?,

            // === Löschen & Zwischenablage ===
            AppCommand::DeleteElements { ids } => handlers::editing::delete_elements(state, &ids)?,
            AppCommand::CopyElements { ids } => handlers::clipboard::copy(state, &ids),
            AppCommand::PasteElements { target, position } => {
                handlers::clipboard::paste(state, target.as_ref(), position)?
            }

            // === History ===
            AppCommand::Undo => handlers::history::undo(state)?,
            AppCommand::Redo => handlers::history::redo(state)?,
        }

        Ok(())
    }
}
