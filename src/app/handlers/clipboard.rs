//! Handler für Kopieren und Einfügen.

use crate::app::AppState;
use crate::copy_paste::PasteOutcome;
use crate::core::ElementId;
use glam::Vec2;

/// Kopiert Elemente in die Zwischenablage der Session.
pub fn copy(state: &mut AppState, ids: &[ElementId]) {
    let tree = state.modeler.copy(ids);
    if tree.is_empty() {
        log::debug!("Kopieren: nichts übernommen");
    }
}

/// Fügt die Zwischenablage ein und selektiert die neuen Elemente.
pub fn paste(state: &mut AppState, target: Option<&ElementId>, position: Vec2) -> anyhow::Result<()> {
    match state.modeler.paste(target, position)? {
        PasteOutcome::Empty => log::debug!("Einfügen: Zwischenablage leer"),
        PasteOutcome::Rejected => log::debug!("Einfügen an Ziel {:?} verworfen", target),
        PasteOutcome::Pasted(created) => {
            state.selection.selected = created.into_values().collect();
        }
    }
    Ok(())
}
