use crate::command::{CommandContext, CommandHandler, CONNECTION_MOVE};
use crate::core::ElementId;
use crate::error::ModelingError;
use crate::modeling::Modeler;

/// Verschiebt alle Wegpunkte einer Connection starr um ein Delta.
pub struct MoveConnectionHandler;

impl CommandHandler for MoveConnectionHandler {
    fn execute(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let ctx = context.as_connection_move_mut(CONNECTION_MOVE)?;
        let old_parent = modeler.canvas.element(&ctx.connection)?.parent.clone();
        ctx.old_parent = old_parent.clone();
        ctx.old_parent_index = None;

        let mut dirty = vec![ctx.connection.clone()];
        if let Some(new_parent) = ctx.new_parent.clone() {
            // Reihenfolge unter dem alten Parent bleibt erhalten
            if old_parent.as_ref() != Some(&new_parent) {
                let (_, old_index) = modeler.canvas.set_parent(
                    &ctx.connection,
                    &new_parent,
                    ctx.new_parent_index,
                )?;
                ctx.old_parent_index = old_index;
                dirty.push(new_parent);
                dirty.extend(old_parent);
            }
        }

        let delta = ctx.delta;
        for waypoint in &mut modeler.canvas.connection_mut(&ctx.connection)?.waypoints {
            waypoint.translate(delta);
        }
        Ok(dirty)
    }

    fn revert(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let ctx = context.as_connection_move(CONNECTION_MOVE)?;
        for waypoint in &mut modeler.canvas.connection_mut(&ctx.connection)?.waypoints {
            waypoint.translate(-ctx.delta);
        }

        let mut dirty = vec![ctx.connection.clone()];
        let current = modeler.canvas.element(&ctx.connection)?.parent.clone();
        if let Some(old_parent) = &ctx.old_parent {
            if current.as_ref() != Some(old_parent) {
                modeler
                    .canvas
                    .set_parent(&ctx.connection, old_parent, ctx.old_parent_index)?;
                dirty.push(old_parent.clone());
                dirty.extend(current);
            }
        }
        Ok(dirty)
    }
}
