use super::place_template;
use crate::command::{CommandContext, CommandHandler, LABEL_CREATE};
use crate::core::ElementId;
use crate::error::ModelingError;
use crate::modeling::Modeler;

/// Legt ein Label an und verknüpft es mit seinem Ziel.
pub struct CreateLabelHandler;

impl CommandHandler for CreateLabelHandler {
    fn execute(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let default_size = (
            modeler.options.default_label_width,
            modeler.options.default_label_height,
        );
        let ctx = context.as_label_create_mut(LABEL_CREATE)?;
        let mut label = ctx.label.clone();
        label.parent = None;

        if let Some(data) = label.shape_data_mut() {
            data.label_target = Some(ctx.label_target.clone());
            if data.bounds.width == 0.0 && data.bounds.height == 0.0 {
                data.bounds.width = default_size.0;
                data.bounds.height = default_size.1;
            }
        }
        place_template(&mut label, ctx.position)?;

        ctx.label = label.clone();
        let id = label.id.clone();
        modeler.canvas.add_shape(label, &ctx.parent, ctx.parent_index)?;

        Ok(vec![id, ctx.label_target.clone()])
    }

    fn revert(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let ctx = context.as_label_create(LABEL_CREATE)?;
        modeler.canvas.remove_shape(&ctx.label.id)?;
        Ok(vec![ctx.label.id.clone(), ctx.label_target.clone()])
    }
}
