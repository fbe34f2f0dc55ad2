use crate::command::{CommandContext, CommandHandler, CONNECTION_LAYOUT};
use crate::core::ElementId;
use crate::error::ModelingError;
use crate::modeling::Modeler;

/// Legt eine Connection über den Layouter neu.
pub struct LayoutConnectionHandler;

impl CommandHandler for LayoutConnectionHandler {
    fn execute(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let ctx = context.as_connection_layout_mut(CONNECTION_LAYOUT)?;
        let element = modeler.canvas.element(&ctx.connection)?;
        let waypoints = modeler
            .layouter
            .layout_connection(&modeler.canvas, element, &ctx.hints);

        let data = modeler.canvas.connection_mut(&ctx.connection)?;
        ctx.old_waypoints = Some(std::mem::replace(&mut data.waypoints, waypoints));
        Ok(vec![ctx.connection.clone()])
    }

    fn revert(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let ctx = context.as_connection_layout(CONNECTION_LAYOUT)?;
        if let Some(old) = &ctx.old_waypoints {
            modeler.canvas.connection_mut(&ctx.connection)?.waypoints = old.clone();
        }
        Ok(vec![ctx.connection.clone()])
    }
}
