use crate::command::{
    CommandContext, CommandHandler, ConnectionLayoutContext, LayoutHints, CONNECTION_LAYOUT,
    SHAPE_RESIZE,
};
use crate::core::ElementId;
use crate::error::ModelingError;
use crate::modeling::layout::{resized_source_anchor, resized_target_anchor};
use crate::modeling::Modeler;

/// Setzt neue Bounds für ein Shape.
///
/// Verbindungen werden proportional zur Größenänderung neu verankert.
/// Attacher verschiebt das Attach-Behavior.
pub struct ResizeShapeHandler;

impl CommandHandler for ResizeShapeHandler {
    fn pre_execute(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<(), ModelingError> {
        let ctx = context.as_shape_resize(SHAPE_RESIZE)?;
        modeler.canvas.shape(&ctx.shape)?;

        let bounds = ctx.new_bounds;
        if !bounds.is_finite() {
            return Err(ModelingError::InvalidBounds);
        }
        let min = ctx.min_size.unwrap_or_else(|| modeler.options.min_shape_size());
        if bounds.width < min.x || bounds.height < min.y {
            return Err(ModelingError::BoundsTooSmall {
                min_width: min.x,
                min_height: min.y,
            });
        }
        Ok(())
    }

    fn execute(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let ctx = context.as_shape_resize_mut(SHAPE_RESIZE)?;
        let shape = modeler.canvas.shape_mut(&ctx.shape)?;
        ctx.old_bounds = Some(shape.bounds);
        shape.bounds = ctx.new_bounds;
        Ok(vec![ctx.shape.clone()])
    }

    fn post_execute(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<(), ModelingError> {
        let ctx = context.as_shape_resize(SHAPE_RESIZE)?.clone();
        let Some(old_bounds) = ctx.old_bounds else {
            return Ok(());
        };
        if !ctx.hints.layout {
            return Ok(());
        }

        let element = modeler.canvas.element(&ctx.shape)?;
        let incoming = element.incoming().to_vec();
        let outgoing = element.outgoing().to_vec();

        for id in incoming {
            let data = modeler.canvas.connection(&id)?;
            let hints = LayoutHints {
                connection_end: Some(resized_target_anchor(data, &ctx.new_bounds, &old_bounds)),
                ..LayoutHints::default()
            };
            modeler.execute(CONNECTION_LAYOUT, ConnectionLayoutContext::new(id, hints))?;
        }
        for id in outgoing {
            let data = modeler.canvas.connection(&id)?;
            let hints = LayoutHints {
                connection_start: Some(resized_source_anchor(data, &ctx.new_bounds, &old_bounds)),
                ..LayoutHints::default()
            };
            modeler.execute(CONNECTION_LAYOUT, ConnectionLayoutContext::new(id, hints))?;
        }
        Ok(())
    }

    fn revert(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let ctx = context.as_shape_resize(SHAPE_RESIZE)?;
        if let Some(old_bounds) = ctx.old_bounds {
            modeler.canvas.shape_mut(&ctx.shape)?.bounds = old_bounds;
        }
        Ok(vec![ctx.shape.clone()])
    }
}
