//! Handler für Selektions-Operationen.

use crate::app::AppState;
use crate::core::{Canvas, ElementId};
use indexmap::IndexSet;

/// Setzt bzw. erweitert die Selektion. Unbekannte IDs werden ignoriert.
pub fn select(state: &mut AppState, ids: Vec<ElementId>, additive: bool) {
    if !additive {
        state.selection.selected.clear();
    }

    let canvas = state.modeler.canvas();
    for id in ids {
        match canvas.get(&id) {
            Some(element) if !element.is_root() => {
                state.selection.selected.insert(id);
            }
            Some(_) => log::debug!("Root '{}' ist nicht selektierbar", id),
            None => log::warn!("Selektion: Element '{}' existiert nicht", id),
        }
    }
}

/// Hebt die Selektion auf.
pub fn clear(state: &mut AppState) {
    state.selection.selected.clear();
}

/// Selektiert alle Shapes und Connections unterhalb des aktiven Roots
/// (Dokument-Reihenfolge).
pub fn select_all(state: &mut AppState) {
    state.selection.selected.clear();
    let Some(root) = state.modeler.canvas().root_element().cloned() else {
        return;
    };
    collect_descendants(state.modeler.canvas(), &root, &mut state.selection.selected);
}

fn collect_descendants(canvas: &Canvas, id: &str, out: &mut IndexSet<ElementId>) {
    let Some(element) = canvas.get(id) else {
        return;
    };
    for child in &element.children {
        out.insert(child.clone());
        collect_descendants(canvas, child, out);
    }
}
