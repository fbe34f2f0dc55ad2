use super::remove_element;
use crate::command::{CommandContext, CommandHandler, SHAPE_DELETE};
use crate::core::ElementId;
use crate::error::ModelingError;
use crate::modeling::Modeler;

/// Löscht ein Shape samt Verbindungen und Kindern.
///
/// Verbindungen und Kinder werden in `pre_execute` als eigene Commands
/// entfernt; `execute` entfernt danach nur noch das (freie) Shape selbst.
pub struct DeleteShapeHandler;

impl CommandHandler for DeleteShapeHandler {
    fn pre_execute(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<(), ModelingError> {
        let ctx = context.as_shape_delete(SHAPE_DELETE)?;
        let element = modeler.canvas.element(&ctx.shape)?;
        let connections: Vec<ElementId> = element.connections().cloned().collect();
        let children = element.children.clone();

        for id in connections.iter().chain(children.iter()) {
            remove_element(modeler, id)?;
        }
        Ok(())
    }

    fn execute(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let ctx = context.as_shape_delete_mut(SHAPE_DELETE)?;
        let element = modeler.canvas.element(&ctx.shape)?;
        let parent = element.parent.clone();
        ctx.old_parent_index = modeler.canvas.index_in_parent(&ctx.shape);

        let removed = modeler.canvas.remove_shape(&ctx.shape)?;
        ctx.old_parent = parent.clone();
        ctx.removed = Some(removed);

        Ok(parent.into_iter().collect())
    }

    fn revert(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let ctx = context.as_shape_delete(SHAPE_DELETE)?;
        let element = ctx.removed.clone().ok_or(ModelingError::MissingParent)?;
        let parent = ctx.old_parent.clone().ok_or(ModelingError::MissingParent)?;

        modeler
            .canvas
            .add_shape(element, &parent, ctx.old_parent_index)?;
        Ok(vec![ctx.shape.clone(), parent])
    }
}
