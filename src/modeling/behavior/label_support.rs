//! Labels folgen ihrem Target: beim Verschieben und beim Löschen.

use crate::command::*;
use crate::core::ElementId;
use crate::error::ModelingError;
use crate::modeling::Modeler;

#[derive(Debug, Default, Clone, Copy)]
pub struct LabelSupport;

impl CommandInterceptor for LabelSupport {
    fn intercept(
        &self,
        phase: Phase,
        command: &str,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<(), ModelingError> {
        match (phase, command) {
            (Phase::PreExecuted, ELEMENTS_MOVE) => add_labels_to_closure(modeler, context),
            (Phase::PostExecute, SHAPE_MOVE) => move_label_with_shape(modeler, context),
            (Phase::PreExecute, SHAPE_DELETE) => {
                let shape = context.as_shape_delete(SHAPE_DELETE)?.shape.clone();
                remove_label(modeler, &shape)
            }
            (Phase::PreExecute, CONNECTION_DELETE) => {
                let connection = context.as_connection_delete(CONNECTION_DELETE)?.connection.clone();
                remove_label(modeler, &connection)
            }
            _ => Ok(()),
        }
    }
}

/// Labels eingeschlossener Elemente wandern mit (nicht top-level).
fn add_labels_to_closure(
    modeler: &mut Modeler,
    context: &mut CommandContext,
) -> Result<(), ModelingError> {
    let ctx = context.as_elements_move_mut(ELEMENTS_MOVE)?;
    let Some(closure) = ctx.closure.as_mut() else {
        return Ok(());
    };

    let labels: Vec<ElementId> = closure
        .enclosed_elements
        .iter()
        .filter_map(|id| modeler.canvas.get(id).and_then(|e| e.label.clone()))
        .filter(|label| !closure.enclosed_elements.contains(label))
        .collect();
    closure.add_all(&modeler.canvas, &labels, false);
    Ok(())
}

/// Einzelnes `shape.move` (rekursiv) nimmt das Label mit; Closure-Moves
/// enthalten das Label bereits.
fn move_label_with_shape(
    modeler: &mut Modeler,
    context: &mut CommandContext,
) -> Result<(), ModelingError> {
    let ctx = context.as_shape_move(SHAPE_MOVE)?;
    if !ctx.hints.recurse {
        return Ok(());
    }
    let Some(label) = modeler.canvas.element(&ctx.shape)?.label.clone() else {
        return Ok(());
    };
    let mut label_move = ShapeMoveContext::new(label, ctx.delta);
    label_move.hints = MoveHints {
        recurse: false,
        layout: false,
        ..MoveHints::default()
    };
    modeler.execute(SHAPE_MOVE, label_move)?;
    Ok(())
}

fn remove_label(modeler: &mut Modeler, target: &ElementId) -> Result<(), ModelingError> {
    let Some(label) = modeler.canvas.get(target).and_then(|e| e.label.clone()) else {
        return Ok(());
    };
    modeler.execute(SHAPE_DELETE, ShapeDeleteContext::new(label))?;
    Ok(())
}
