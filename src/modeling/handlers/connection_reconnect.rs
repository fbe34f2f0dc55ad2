use crate::command::{CommandContext, CommandHandler, CONNECTION_RECONNECT};
use crate::core::ElementId;
use crate::error::ModelingError;
use crate::modeling::Modeler;

/// Hängt Start und/oder Ende einer Connection um.
///
/// Explizite Wegpunkte werden übernommen, sonst legt der Layouter die
/// Connection mit den Anker-Hints neu.
pub struct ReconnectConnectionHandler;

impl CommandHandler for ReconnectConnectionHandler {
    fn execute(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let ctx = context.as_connection_reconnect_mut(CONNECTION_RECONNECT)?;
        let (old_source, old_target) =
            modeler
                .canvas
                .set_endpoints(&ctx.connection, &ctx.new_source, &ctx.new_target)?;

        let waypoints = match &ctx.waypoints {
            Some(waypoints) => waypoints.clone(),
            None => {
                let element = modeler.canvas.element(&ctx.connection)?;
                modeler
                    .layouter
                    .layout_connection(&modeler.canvas, element, &ctx.hints)
            }
        };
        let data = modeler.canvas.connection_mut(&ctx.connection)?;
        ctx.old_waypoints = Some(std::mem::replace(&mut data.waypoints, waypoints));

        let dirty = vec![
            ctx.connection.clone(),
            old_source.clone(),
            old_target.clone(),
            ctx.new_source.clone(),
            ctx.new_target.clone(),
        ];
        ctx.old_source = Some(old_source);
        ctx.old_target = Some(old_target);
        Ok(dirty)
    }

    fn revert(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let ctx = context.as_connection_reconnect(CONNECTION_RECONNECT)?;
        let (Some(old_source), Some(old_target)) = (&ctx.old_source, &ctx.old_target) else {
            return Ok(Vec::new());
        };
        modeler
            .canvas
            .set_endpoints(&ctx.connection, old_source, old_target)?;
        if let Some(old) = &ctx.old_waypoints {
            modeler.canvas.connection_mut(&ctx.connection)?.waypoints = old.clone();
        }

        Ok(vec![
            ctx.connection.clone(),
            old_source.clone(),
            old_target.clone(),
            ctx.new_source.clone(),
            ctx.new_target.clone(),
        ])
    }
}
