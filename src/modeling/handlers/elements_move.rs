use crate::command::{CommandContext, CommandHandler, ELEMENTS_MOVE};
use crate::core::ElementId;
use crate::error::ModelingError;
use crate::modeling::{get_closure, Modeler};

/// Verschiebt eine Selektion samt Closure.
///
/// Die Closure entsteht im Pre-Execute und kann von Behaviors im
/// Pre-Executed erweitert werden (Attacher, Labels).
pub struct MoveElementsHandler;

impl CommandHandler for MoveElementsHandler {
    fn pre_execute(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<(), ModelingError> {
        let ctx = context.as_elements_move_mut(ELEMENTS_MOVE)?;
        ctx.closure = Some(get_closure(&modeler.canvas, &ctx.shapes));
        Ok(())
    }

    fn execute(
        &self,
        _modeler: &mut Modeler,
        _context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        Ok(Vec::new())
    }

    fn post_execute(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<(), ModelingError> {
        let ctx = context.as_elements_move(ELEMENTS_MOVE)?.clone();
        let closure = match ctx.closure {
            Some(closure) => closure,
            None => get_closure(&modeler.canvas, &ctx.shapes),
        };
        modeler.move_closure(
            &closure,
            ctx.delta,
            ctx.new_parent.as_ref(),
            ctx.hints.primary_shape.as_ref(),
        )
    }

    fn revert(
        &self,
        _modeler: &mut Modeler,
        _context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        Ok(Vec::new())
    }
}
