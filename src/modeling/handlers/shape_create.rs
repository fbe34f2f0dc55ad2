use super::place_template;
use crate::command::{CommandContext, CommandHandler, SHAPE_CREATE};
use crate::core::ElementId;
use crate::error::ModelingError;
use crate::modeling::Modeler;

/// Legt ein Shape an (Mittelpunkt- oder Bounds-Platzierung).
///
/// Das Anheften an `host` übernimmt das Attach-Behavior im Post-Execute.
pub struct CreateShapeHandler;

impl CommandHandler for CreateShapeHandler {
    fn execute(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let ctx = context.as_shape_create_mut(SHAPE_CREATE)?;
        let mut shape = ctx.shape.clone();
        place_template(&mut shape, ctx.position)?;
        shape.parent = None;

        // platziertes Template für Redo merken
        ctx.shape = shape.clone();
        let id = shape.id.clone();
        modeler.canvas.add_shape(shape, &ctx.parent, ctx.parent_index)?;

        Ok(vec![id])
    }

    fn revert(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let ctx = context.as_shape_create(SHAPE_CREATE)?;
        modeler.canvas.remove_shape(&ctx.shape.id)?;
        Ok(vec![ctx.shape.id.clone()])
    }
}
