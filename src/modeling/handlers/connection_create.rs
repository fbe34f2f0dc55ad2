use crate::command::{CommandContext, CommandHandler, CONNECTION_CREATE};
use crate::core::ElementId;
use crate::error::ModelingError;
use crate::modeling::Modeler;

/// Legt eine Connection zwischen zwei bestehenden Shapes an.
///
/// Ohne Wegpunkte im Template wird die Connection über den Layouter gelegt.
pub struct CreateConnectionHandler;

impl CommandHandler for CreateConnectionHandler {
    fn execute(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let ctx = context.as_connection_create_mut(CONNECTION_CREATE)?;
        let id = ctx.connection.id.clone();
        if modeler.canvas.shape(&ctx.source).is_err() || modeler.canvas.shape(&ctx.target).is_err() {
            return Err(ModelingError::MissingEndpoint(id));
        }

        let mut connection = ctx.connection.clone();
        connection.parent = None;
        let data = connection
            .connection_data_mut()
            .ok_or_else(|| ModelingError::UnexpectedKind {
                id: id.clone(),
                expected: "Connection",
            })?;
        data.source = ctx.source.clone();
        data.target = ctx.target.clone();

        if data.waypoints.is_empty() {
            let waypoints = modeler
                .layouter
                .layout_connection(&modeler.canvas, &connection, &ctx.hints);
            if let Some(data) = connection.connection_data_mut() {
                data.waypoints = waypoints;
            }
        }

        ctx.connection = connection.clone();
        modeler
            .canvas
            .add_connection(connection, &ctx.parent, ctx.parent_index)?;

        Ok(vec![id, ctx.source.clone(), ctx.target.clone()])
    }

    fn revert(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let ctx = context.as_connection_create(CONNECTION_CREATE)?;
        modeler.canvas.remove_connection(&ctx.connection.id)?;
        Ok(vec![ctx.source.clone(), ctx.target.clone()])
    }
}
