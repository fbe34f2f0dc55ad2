use crate::command::*;
use crate::copy_paste::{Descriptor, DescriptorGeometry};
use crate::core::geometry::round_point;
use crate::core::{bounding_box, Element, ElementId};
use crate::error::ModelingError;
use crate::modeling::Modeler;
use indexmap::IndexMap;

/// Legt mehrere Elemente aus Deskriptoren an.
///
/// Deskriptoren werden in der gegebenen Reihenfolge erzeugt; Parent, Host,
/// Label-Target und Endpunkte werden über die bereits erzeugten IDs
/// aufgelöst. Connections und Labels mit unaufgelösten Referenzen werden
/// übersprungen.
pub struct CreateElementsHandler;

impl CommandHandler for CreateElementsHandler {
    fn pre_execute(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<(), ModelingError> {
        let ctx = context.as_elements_create(ELEMENTS_CREATE)?.clone();
        let mut descriptors = ctx.descriptors;

        if let Some(position) = ctx.position {
            if let Some(bbox) = bounding_box(descriptors.iter().filter_map(Descriptor::outline)) {
                let mut delta = position - bbox.center();
                if modeler.options.round_pasted_positions {
                    delta = round_point(delta);
                }
                for descriptor in &mut descriptors {
                    descriptor.translate(delta);
                }
            }
        }

        let mut created: IndexMap<ElementId, ElementId> = IndexMap::new();
        for descriptor in &descriptors {
            if let Some(id) = create_descriptor(modeler, descriptor, &ctx.parent, &created)? {
                created.insert(descriptor.id.clone(), id);
            }
        }

        context.as_elements_create_mut(ELEMENTS_CREATE)?.created = created;
        Ok(())
    }

    fn execute(
        &self,
        _modeler: &mut Modeler,
        _context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        Ok(Vec::new())
    }

    fn revert(
        &self,
        _modeler: &mut Modeler,
        _context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError> {
        Ok(Vec::new())
    }
}

/// Erzeugt ein Element; `Ok(None)` bei unaufgelösten Referenzen.
fn create_descriptor(
    modeler: &mut Modeler,
    descriptor: &Descriptor,
    default_parent: &ElementId,
    created: &IndexMap<ElementId, ElementId>,
) -> Result<Option<ElementId>, ModelingError> {
    let resolve = |id: &ElementId| created.get(id).cloned();
    let parent = descriptor
        .parent
        .as_ref()
        .and_then(resolve)
        .unwrap_or_else(|| default_parent.clone());

    let id = match &descriptor.geometry {
        DescriptorGeometry::Shape { bounds, host } => {
            let id = modeler.unique_id("shape");
            let mut shape = Element::shape(id.clone(), descriptor.element_type.clone(), *bounds);
            shape.properties = descriptor.properties.clone();
            shape.hidden = descriptor.hidden;
            modeler.execute(
                SHAPE_CREATE,
                ShapeCreateContext {
                    shape,
                    position: Placement::Bounds(*bounds),
                    parent,
                    parent_index: None,
                    host: host.as_ref().and_then(resolve),
                },
            )?;
            id
        }
        DescriptorGeometry::Label {
            bounds,
            label_target,
        } => {
            let Some(target) = resolve(label_target) else {
                log::debug!("Label '{}' ohne Target übersprungen", descriptor.id);
                return Ok(None);
            };
            let id = modeler.unique_id("label");
            let mut label = Element::label(
                id.clone(),
                descriptor.element_type.clone(),
                target.clone(),
                *bounds,
            );
            label.properties = descriptor.properties.clone();
            label.hidden = descriptor.hidden;
            modeler.execute(
                LABEL_CREATE,
                LabelCreateContext {
                    label,
                    label_target: target,
                    position: Placement::Bounds(*bounds),
                    parent,
                    parent_index: None,
                },
            )?;
            id
        }
        DescriptorGeometry::Connection {
            source,
            target,
            waypoints,
        } => {
            let (Some(source), Some(target)) = (resolve(source), resolve(target)) else {
                log::debug!("Connection '{}' ohne Endpunkte übersprungen", descriptor.id);
                return Ok(None);
            };
            let id = modeler.unique_id("connection");
            let mut connection = Element::connection(
                id.clone(),
                descriptor.element_type.clone(),
                source.clone(),
                target.clone(),
                waypoints.clone(),
            );
            connection.properties = descriptor.properties.clone();
            connection.hidden = descriptor.hidden;
            modeler.execute(
                CONNECTION_CREATE,
                ConnectionCreateContext {
                    connection,
                    source,
                    target,
                    parent,
                    parent_index: None,
                    hints: LayoutHints::default(),
                },
            )?;
            id
        }
    };
    Ok(Some(id))
}
