use crate::command::{CommandContext, CommandHandler, PROPERTIES_UPDATE};
use crate::core::ElementId;
use crate::error::ModelingError;
use crate::modeling::Modeler;
use serde_json::Value;

/// Setzt fachliche Properties eines Elements; `null` entfernt den Schlüssel.
pub struct UpdatePropertiesHandler;

impl CommandHandler for UpdatePropertiesHandler {
    fn execute(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let ctx = context.as_properties_update_mut(PROPERTIES_UPDATE)?;
        let element = modeler.canvas.element_mut(&ctx.element)?;
        ctx.old_properties = Some(element.properties.clone());

        for (key, value) in &ctx.properties {
            if value == &Value::Null {
                element.properties.remove(key);
            } else {
                element.properties.insert(key.clone(), value.clone());
            }
        }
        Ok(vec![ctx.element.clone()])
    }

    fn revert(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        let ctx = context.as_properties_update(PROPERTIES_UPDATE)?;
        if let Some(old) = &ctx.old_properties {
            modeler.canvas.element_mut(&ctx.element)?.properties = old.clone();
        }
        Ok(vec![ctx.element.clone()])
    }
}
