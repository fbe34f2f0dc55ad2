//! Primitive Command-Handler.
//!
//! Jeder Handler mutiert den Canvas ausschließlich in `execute`/`revert`
//! und löst Folge-Commands nur in `pre_execute`/`post_execute` aus.

mod attachment_update;
mod connection_create;
mod connection_delete;
mod connection_layout;
mod connection_move;
mod connection_reconnect;
mod elements_create;
mod elements_delete;
mod elements_move;
mod elements_paste;
mod label_create;
mod properties_update;
mod shape_create;
mod shape_delete;
mod shape_move;
mod shape_replace;
mod shape_resize;

pub use attachment_update::UpdateAttachmentHandler;
pub use connection_create::CreateConnectionHandler;
pub use connection_delete::DeleteConnectionHandler;
pub use connection_layout::LayoutConnectionHandler;
pub use connection_move::MoveConnectionHandler;
pub use connection_reconnect::ReconnectConnectionHandler;
pub use elements_create::CreateElementsHandler;
pub use elements_delete::DeleteElementsHandler;
pub use elements_move::MoveElementsHandler;
pub use elements_paste::PasteElementsHandler;
pub use label_create::CreateLabelHandler;
pub use properties_update::UpdatePropertiesHandler;
pub use shape_create::CreateShapeHandler;
pub use shape_delete::DeleteShapeHandler;
pub use shape_move::MoveShapeHandler;
pub use shape_replace::ReplaceShapeHandler;
pub use shape_resize::ResizeShapeHandler;

use crate::command::*;
use crate::core::{Bounds, Element, ElementId};
use crate::error::ModelingError;
use std::rc::Rc;

/// Registriert alle Standard-Handler.
pub fn register_default_handlers(stack: &mut CommandStack) {
    stack.register_handler(SHAPE_CREATE, Rc::new(CreateShapeHandler));
    stack.register_handler(LABEL_CREATE, Rc::new(CreateLabelHandler));
    stack.register_handler(SHAPE_DELETE, Rc::new(DeleteShapeHandler));
    stack.register_handler(SHAPE_MOVE, Rc::new(MoveShapeHandler));
    stack.register_handler(SHAPE_RESIZE, Rc::new(ResizeShapeHandler));
    stack.register_handler(SHAPE_REPLACE, Rc::new(ReplaceShapeHandler));
    stack.register_handler(CONNECTION_CREATE, Rc::new(CreateConnectionHandler));
    stack.register_handler(CONNECTION_DELETE, Rc::new(DeleteConnectionHandler));
    stack.register_handler(CONNECTION_MOVE, Rc::new(MoveConnectionHandler));
    stack.register_handler(CONNECTION_LAYOUT, Rc::new(LayoutConnectionHandler));
    stack.register_handler(CONNECTION_RECONNECT, Rc::new(ReconnectConnectionHandler));
    stack.register_handler(ATTACHMENT_UPDATE, Rc::new(UpdateAttachmentHandler));
    stack.register_handler(PROPERTIES_UPDATE, Rc::new(UpdatePropertiesHandler));
    stack.register_handler(ELEMENTS_MOVE, Rc::new(MoveElementsHandler));
    stack.register_handler(ELEMENTS_CREATE, Rc::new(CreateElementsHandler));
    stack.register_handler(ELEMENTS_DELETE, Rc::new(DeleteElementsHandler));
    stack.register_handler(ELEMENTS_PASTE, Rc::new(PasteElementsHandler));
}

/// Setzt die Bounds eines Shape-Templates gemäß Platzierung.
pub(crate) fn place_template(template: &mut Element, placement: Placement) -> Result<(), ModelingError> {
    let id = template.id.clone();
    let data = template
        .shape_data_mut()
        .ok_or(ModelingError::UnexpectedKind {
            id,
            expected: "Shape",
        })?;

    data.bounds = match placement {
        Placement::Bounds(bounds) => bounds,
        Placement::Center(center) => {
            Bounds::from_center(center, data.bounds.width, data.bounds.height)
        }
    };
    if !data.bounds.is_finite() {
        return Err(ModelingError::InvalidBounds);
    }
    Ok(())
}

/// Löscht ein Element passend zu seiner Art (Shape/Label oder Connection).
pub(crate) fn remove_element(modeler: &mut crate::modeling::Modeler, id: &ElementId) -> Result<(), ModelingError> {
    let Some(element) = modeler.canvas.get(id) else {
        return Ok(());
    };
    if element.is_connection() {
        modeler.execute(CONNECTION_DELETE, ConnectionDeleteContext::new(id.clone()))?;
    } else if element.is_shape() {
        modeler.execute(SHAPE_DELETE, ShapeDeleteContext::new(id.clone()))?;
    }
    Ok(())
}
