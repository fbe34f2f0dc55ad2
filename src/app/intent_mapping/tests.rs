use crate::app::{AppCommand, AppIntent, AppState, MoveOperation};
use crate::core::ElementId;
use crate::rules::Allowed;
use glam::Vec2;

use super::map_intent_to_commands;

fn state_with_selection(ids: &[&str]) -> AppState {
    let mut state = AppState::new();
    state
        .selection
        .selected
        .extend(ids.iter().map(|id| ElementId::from(*id)));
    state
}

#[test]
fn delete_selected_maps_to_delete_then_clear() {
    let state = state_with_selection(&["a", "b"]);

    let commands = map_intent_to_commands(&state, AppIntent::DeleteSelectedRequested);

    assert_eq!(commands.len(), 2);
    assert_eq!(
        commands[0],
        AppCommand::DeleteElements {
            ids: vec![ElementId::from("a"), ElementId::from("b")]
        }
    );
    assert!(matches!(commands[1], AppCommand::ClearSelection));
}

#[test]
fn delete_and_copy_without_selection_map_to_nothing() {
    let state = AppState::new();

    assert!(map_intent_to_commands(&state, AppIntent::DeleteSelectedRequested).is_empty());
    assert!(map_intent_to_commands(&state, AppIntent::CopyRequested).is_empty());
}

#[test]
fn drag_update_without_running_drag_is_ignored() {
    let state = state_with_selection(&["a"]);

    let commands = map_intent_to_commands(
        &state,
        AppIntent::DragUpdateRequested {
            position: Vec2::new(10.0, 0.0),
            hover: None,
        },
    );

    assert!(commands.is_empty());
}

#[test]
fn undo_during_drag_cancels_drag_first() {
    let mut state = state_with_selection(&["a"]);
    state.drag = Some(MoveOperation {
        shapes: vec![ElementId::from("a")],
        start: Vec2::ZERO,
        delta: Vec2::ZERO,
        hover: None,
        allowed: Allowed::DontCare,
    });

    let commands = map_intent_to_commands(&state, AppIntent::UndoRequested);

    assert_eq!(commands, vec![AppCommand::CancelMove, AppCommand::Undo]);
}

#[test]
fn connect_without_type_uses_default_connection_type() {
    let state = AppState::new();

    let commands = map_intent_to_commands(
        &state,
        AppIntent::ConnectRequested {
            id: None,
            source: ElementId::from("a"),
            target: ElementId::from("b"),
            element_type: None,
        },
    );

    match &commands[..] {
        [AppCommand::CreateConnection { element_type, .. }] => {
            assert_eq!(element_type, "connection")
        }
        other => panic!("Unerwartete Commands: {other:?}"),
    }
}
