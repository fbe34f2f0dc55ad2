use crate::command::{CommandContext, CommandHandler, CONNECTION_DELETE};
use crate::core::ElementId;
use crate::error::ModelingError;
use crate::modeling::Modeler;

/// Entfernt eine Connection. Das Label entfernt vorher das Label-Behavior.
pub struct DeleteConnectionHandler;

impl CommandHandler for DeleteConnectionHandler {
    fn execute(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let ctx = context.as_connection_delete_mut(CONNECTION_DELETE)?;
        ctx.old_parent_index = modeler.canvas.index_in_parent(&ctx.connection);

        let removed = modeler.canvas.remove_connection(&ctx.connection)?;
        let mut dirty: Vec<ElementId> = removed.parent.iter().cloned().collect();
        if let Some(data) = removed.connection_data() {
            dirty.push(data.source.clone());
            dirty.push(data.target.clone());
        }
        ctx.old_parent = removed.parent.clone();
        ctx.removed = Some(removed);

        Ok(dirty)
    }

    fn revert(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let ctx = context.as_connection_delete(CONNECTION_DELETE)?;
        let element = ctx.removed.clone().ok_or(ModelingError::MissingParent)?;
        let parent = ctx.old_parent.clone().ok_or(ModelingError::MissingParent)?;

        let mut dirty = vec![ctx.connection.clone(), parent.clone()];
        if let Some(data) = element.connection_data() {
            dirty.push(data.source.clone());
            dirty.push(data.target.clone());
        }
        modeler
            .canvas
            .add_connection(element, &parent, ctx.old_parent_index)?;
        Ok(dirty)
    }
}
