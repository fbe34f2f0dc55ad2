use crate::command::{
    CommandContext, CommandHandler, ConnectionLayoutContext, LayoutHints, CONNECTION_LAYOUT,
    SHAPE_MOVE,
};
use crate::core::ElementId;
use crate::error::ModelingError;
use crate::modeling::layout::{moved_source_anchor, moved_target_anchor};
use crate::modeling::Modeler;

/// Verschiebt ein einzelnes Shape, optional mit Parent-Wechsel.
///
/// Im Post-Execute werden (je nach Hints) die Verbindungen neu verankert
/// und die Kinder rekursiv mitbewegt.
pub struct MoveShapeHandler;

impl CommandHandler for MoveShapeHandler {
    fn execute(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let ctx = context.as_shape_move_mut(SHAPE_MOVE)?;
        let bounds = modeler.canvas.shape(&ctx.shape)?.bounds;
        let old_parent = modeler.canvas.element(&ctx.shape)?.parent.clone();
        ctx.old_bounds = Some(bounds);
        ctx.old_parent = old_parent.clone();
        ctx.old_parent_index = None;

        let mut dirty = vec![ctx.shape.clone()];
        if let Some(new_parent) = ctx.new_parent.clone() {
            if old_parent.as_ref() != Some(&new_parent) {
                let (_, old_index) =
                    modeler
                        .canvas
                        .set_parent(&ctx.shape, &new_parent, ctx.new_parent_index)?;
                ctx.old_parent_index = old_index;
                dirty.push(new_parent);
                dirty.extend(old_parent);
            }
        }

        modeler.canvas.shape_mut(&ctx.shape)?.bounds = bounds.translate(ctx.delta);
        Ok(dirty)
    }

    fn post_execute(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<(), ModelingError> {
        let ctx = context.as_shape_move(SHAPE_MOVE)?.clone();
        let element = modeler.canvas.element(&ctx.shape)?;
        let incoming = element.incoming().to_vec();
        let outgoing = element.outgoing().to_vec();
        let children = element.children.clone();
        let bounds = modeler.canvas.shape(&ctx.shape)?.bounds;

        if ctx.hints.layout {
            for id in incoming {
                let data = modeler.canvas.connection(&id)?;
                let hints = LayoutHints {
                    connection_end: Some(moved_target_anchor(data, &bounds, ctx.delta)),
                    ..LayoutHints::default()
                };
                modeler.execute(CONNECTION_LAYOUT, ConnectionLayoutContext::new(id, hints))?;
            }
            for id in outgoing {
                let data = modeler.canvas.connection(&id)?;
                let hints = LayoutHints {
                    connection_start: Some(moved_source_anchor(data, &bounds, ctx.delta)),
                    ..LayoutHints::default()
                };
                modeler.execute(CONNECTION_LAYOUT, ConnectionLayoutContext::new(id, hints))?;
            }
        }

        if ctx.hints.recurse && !children.is_empty() {
            modeler.move_recursive(&children, ctx.delta, None)?;
        }
        Ok(())
    }

    fn revert(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let ctx = context.as_shape_move(SHAPE_MOVE)?;
        let shape = modeler.canvas.shape_mut(&ctx.shape)?;
        shape.bounds = shape.bounds.translate(-ctx.delta);

        let mut dirty = vec![ctx.shape.clone()];
        let current = modeler.canvas.element(&ctx.shape)?.parent.clone();
        if let Some(old_parent) = &ctx.old_parent {
            if current.as_ref() != Some(old_parent) {
                modeler
                    .canvas
                    .set_parent(&ctx.shape, old_parent, ctx.old_parent_index)?;
                dirty.push(old_parent.clone());
                dirty.extend(current);
            }
        }
        Ok(dirty)
    }
}
