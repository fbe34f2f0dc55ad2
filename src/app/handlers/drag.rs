//! Drag-Move als Zustandsmaschine: Start → Update* → Ende | Abbruch.
//!
//! Start und Update verändern nur die `MoveOperation`. Erst das Ende führt
//! genau ein `elements.move` aus; die Regel-Antwort für das Ziel entscheidet,
//! ob neu geparentet (`Yes`/`DontCare`) oder angeheftet (`Attach`) wird.

use crate::app::{AppState, MoveOperation};
use crate::command::MoveHints;
use crate::core::ElementId;
use crate::rules::{self, Allowed, RuleContext};
use glam::Vec2;

/// Startet eine Move-Operation für alle selektierten Shapes.
pub fn begin(state: &mut AppState, position: Vec2) {
    let canvas = state.modeler.canvas();
    let shapes: Vec<ElementId> = state
        .selection
        .selected
        .iter()
        .filter(|id| canvas.get(id).is_some_and(|element| element.is_shape()))
        .cloned()
        .collect();

    if shapes.is_empty() {
        log::debug!("Drag-Start ohne verschiebbare Shapes ignoriert");
        return;
    }

    state.drag = Some(MoveOperation {
        shapes,
        start: position,
        delta: Vec2::ZERO,
        hover: None,
        allowed: Allowed::DontCare,
    });
}

/// Aktualisiert Delta, Ziel und Regel-Antwort.
pub fn update(state: &mut AppState, position: Vec2, hover: Option<ElementId>) {
    let Some(operation) = state.drag.as_mut() else {
        return;
    };

    // Ein bewegtes Shape kann nicht sein eigenes Ziel sein
    let hover = hover.filter(|id| !operation.shapes.contains(id));

    operation.delta = position - operation.start;
    operation.allowed = match &hover {
        Some(target) => state.modeler.allowed(
            rules::ELEMENTS_MOVE,
            &RuleContext::ElementsMove {
                shapes: &operation.shapes,
                target: Some(target),
                position: Some(position),
            },
        ),
        None => Allowed::DontCare,
    };
    operation.hover = hover;
}

/// Übernimmt die Move-Operation.
pub fn end(state: &mut AppState) -> anyhow::Result<()> {
    let Some(operation) = state.drag.take() else {
        return Ok(());
    };

    if operation.allowed == Allowed::No {
        log::warn!(
            "Verschieben von {} Shape(s) nach {:?} nicht erlaubt",
            operation.shapes.len(),
            operation.hover
        );
        return Ok(());
    }
    if operation.delta == Vec2::ZERO && operation.hover.is_none() {
        log::debug!("Drag ohne Bewegung beendet");
        return Ok(());
    }

    let hints = MoveHints {
        primary_shape: operation.shapes.first().cloned(),
        attach: (operation.allowed == Allowed::Attach).then_some(true),
        ..MoveHints::default()
    };
    state.modeler.move_elements(
        &operation.shapes,
        operation.delta,
        operation.hover.as_ref(),
        hints,
    )?;
    log::info!(
        "{} Shape(s) um ({:.1}, {:.1}) verschoben",
        operation.shapes.len(),
        operation.delta.x,
        operation.delta.y
    );
    Ok(())
}

/// Verwirft eine laufende Move-Operation.
pub fn cancel(state: &mut AppState) {
    if state.drag.take().is_some() {
        log::debug!("Drag abgebrochen");
    }
}
