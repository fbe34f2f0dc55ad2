use crate::command::*;
use crate::copy_paste::tree::target_anchor;
use crate::copy_paste::{CopyDelta, CopyTree, Descriptor, DescriptorGeometry};
use crate::core::geometry::round_point;
use crate::core::{ElementId, Waypoint};
use crate::error::ModelingError;
use crate::modeling::Modeler;
use glam::Vec2;
use indexmap::IndexMap;

/// Fügt einen Kopier-Baum unter `target` ein.
///
/// Der Baum wird Tiefe für Tiefe (innerhalb einer Tiefe nach Priorität) in
/// absolute Deskriptoren übersetzt und über `elements.create` angelegt.
/// Anschließend schreiben die Deskriptor-Bausteine Referenzen um.
pub struct PasteElementsHandler;

impl CommandHandler for PasteElementsHandler {
    fn pre_execute(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<(), ModelingError> {
        let ctx = context.as_elements_paste(ELEMENTS_PASTE)?.clone();
        let descriptors = place_tree(&ctx.tree, ctx.position, modeler.options.round_pasted_positions);

        let result = modeler.execute(
            ELEMENTS_CREATE,
            ElementsCreateContext {
                descriptors,
                parent: ctx.target,
                position: None,
                created: IndexMap::new(),
            },
        )?;
        let created = result.as_elements_create(ELEMENTS_CREATE)?.created.clone();

        context.as_elements_paste_mut(ELEMENTS_PASTE)?.created = created;
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
        let ctx = context.as_elements_paste(ELEMENTS_PASTE)?.clone();
        let builders = modeler.descriptor_builders.clone();

        for descriptor in ctx.tree.descriptors() {
            let Some(new_id) = ctx.created.get(&descriptor.id) else {
                continue;
            };
            for builder in &builders {
                if let Some(patch) = builder.resolve_references(descriptor, &ctx.created) {
                    modeler.execute(
                        PROPERTIES_UPDATE,
                        PropertiesUpdateContext::new(new_id.clone(), patch),
                    )?;
                }
            }
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

/// Übersetzt den Baum in absolute Deskriptoren (Position + Delta).
///
/// Labels mit Target-Delta werden relativ zum neuen Anker ihres Targets
/// platziert.
fn place_tree(tree: &CopyTree, position: Vec2, round: bool) -> Vec<Descriptor> {
    let snap = |point: Vec2| if round { round_point(point) } else { point };

    let mut ordered: Vec<(usize, &Descriptor)> = Vec::new();
    for branch in tree.branches.values() {
        let mut branch: Vec<&Descriptor> = branch.iter().collect();
        branch.sort_by_key(|descriptor| descriptor.priority);
        for descriptor in branch {
            ordered.push((ordered.len(), descriptor));
        }
    }

    // Labels zuletzt, damit alle Target-Anker feststehen
    let (labels, others): (Vec<_>, Vec<_>) =
        ordered.into_iter().partition(|(_, descriptor)| descriptor.is_label());

    let mut anchors: IndexMap<ElementId, Vec2> = IndexMap::new();
    let mut placed: Vec<(usize, Descriptor)> = Vec::with_capacity(labels.len() + others.len());

    for (index, descriptor) in others.into_iter().chain(labels) {
        let mut descriptor = descriptor.clone();
        match (&mut descriptor.geometry, descriptor.delta.take()) {
            (DescriptorGeometry::Shape { bounds, .. }, Some(CopyDelta::Center(delta))) => {
                *bounds = bounds.with_position(snap(position + delta));
            }
            (
                DescriptorGeometry::Label {
                    bounds,
                    label_target,
                },
                Some(delta),
            ) => {
                let corner = match (delta, anchors.get(&*label_target)) {
                    (CopyDelta::Target(delta), Some(anchor)) => *anchor + delta,
                    (CopyDelta::Target(delta) | CopyDelta::Center(delta), _) => position + delta,
                    (CopyDelta::Waypoints(_), _) => position,
                };
                *bounds = bounds.with_position(snap(corner));
            }
            (DescriptorGeometry::Connection { waypoints, .. }, Some(CopyDelta::Waypoints(deltas))) => {
                *waypoints = deltas
                    .iter()
                    .map(|delta| Waypoint::from(snap(position + *delta)))
                    .collect();
            }
            _ => {}
        }

        if let Some(anchor) = target_anchor(&descriptor) {
            anchors.insert(descriptor.id.clone(), anchor);
        }
        placed.push((index, descriptor));
    }

    // Einfüge-Reihenfolge wiederherstellen (Tiefe, dann Priorität)
    placed.sort_by_key(|(index, _)| *index);
    placed.into_iter().map(|(_, descriptor)| descriptor).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Bounds;
    use crate::copy_paste::PRIORITY_LABEL;

    #[test]
    fn label_follows_its_target() {
        let shape = Descriptor {
            id: ElementId::from("a"),
            element_type: "task".into(),
            priority: 1,
            parent: None,
            hidden: false,
            geometry: DescriptorGeometry::Shape {
                bounds: Bounds::new(0.0, 0.0, 100.0, 80.0),
                host: None,
            },
            delta: Some(CopyDelta::Center(Vec2::new(-50.0, -40.0))),
            properties: Default::default(),
        };
        let label = Descriptor {
            id: ElementId::from("a_label"),
            element_type: "label".into(),
            priority: PRIORITY_LABEL,
            parent: None,
            hidden: false,
            geometry: DescriptorGeometry::Label {
                bounds: Bounds::new(0.0, 0.0, 90.0, 20.0),
                label_target: ElementId::from("a"),
            },
            delta: Some(CopyDelta::Target(Vec2::new(5.0, 90.0))),
            properties: Default::default(),
        };
        let mut tree = CopyTree::default();
        tree.branches.insert(0, vec![label, shape]);

        let placed = place_tree(&tree, Vec2::new(900.0, 350.0), true);
        assert_eq!(placed[0].id.as_str(), "a");
        assert_eq!(placed[0].outline().map(|b| b.position()), Some(Vec2::new(850.0, 310.0)));
        assert_eq!(placed[1].outline().map(|b| b.position()), Some(Vec2::new(855.0, 400.0)));
    }
}
