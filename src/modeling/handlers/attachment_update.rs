use crate::command::{CommandContext, CommandHandler, ATTACHMENT_UPDATE};
use crate::core::ElementId;
use crate::error::ModelingError;
use crate::modeling::Modeler;

/// Heftet ein Shape an einen Host bzw. löst es (`new_host = None`).
pub struct UpdateAttachmentHandler;

impl CommandHandler for UpdateAttachmentHandler {
    fn execute(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let ctx = context.as_attachment_update_mut(ATTACHMENT_UPDATE)?;
        let (old_host, index) =
            modeler
                .canvas
                .set_host(&ctx.shape, ctx.new_host.as_deref(), None)?;

        let mut dirty = vec![ctx.shape.clone()];
        dirty.extend(old_host.iter().cloned());
        dirty.extend(ctx.new_host.iter().cloned());
        ctx.old_host = old_host;
        ctx.attacher_index = index;
        Ok(dirty)
    }

    fn revert(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let ctx = context.as_attachment_update(ATTACHMENT_UPDATE)?;
        modeler
            .canvas
            .set_host(&ctx.shape, ctx.old_host.as_deref(), ctx.attacher_index)?;

        let mut dirty = vec![ctx.shape.clone()];
        dirty.extend(ctx.old_host.iter().cloned());
        dirty.extend(ctx.new_host.iter().cloned());
        Ok(dirty)
    }
}
