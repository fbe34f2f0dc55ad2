use super::remove_element;
use crate::command::{CommandContext, CommandHandler, ELEMENTS_DELETE};
use crate::core::ElementId;
use crate::error::ModelingError;
use crate::modeling::Modeler;

/// Löscht mehrere Elemente in einer Operation.
///
/// Bereits durch Kaskaden entfernte Elemente werden übersprungen.
pub struct DeleteElementsHandler;

impl CommandHandler for DeleteElementsHandler {
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
        let elements = context.as_elements_delete(ELEMENTS_DELETE)?.elements.clone();
        for id in &elements {
            remove_element(modeler, id)?;
        }
        Ok(())
    }

    fn revert(
        &self,
        _modeler: &mut Modeler,
        _context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        Ok(Vec::new())
    }
}
