//! Kopier-Baum: tiefen-indizierte, nach Abhängigkeit sortierte Deskriptoren.
//!
//! Ablauf von `create_tree`:
//! 1. Top-Level der Selektion bestimmen (Parent nicht selbst selektiert)
//! 2. Tiefensuche; Labels, Attacher und Connections werden auf derselben
//!    Tiefe mitgenommen, Duplikate behalten die tiefste Fundstelle
//! 3. Deskriptoren bauen und stabil nach Priorität sortieren
//! 4. Elemente ohne kopierte Relationen (Connection-Endpunkte, Label-Target)
//!    oder mit `element.copy = No` verwerfen
//! 5. Deltas relativ zum Mittelpunkt der Kopie (Labels: relativ zum Target)

use super::descriptor::{CopyDelta, Descriptor, DescriptorBuilder, DescriptorGeometry};
use crate::core::{bounding_box, Canvas, ElementId};
use crate::rules::{self, Allowed, RuleContext, Rules};
use glam::Vec2;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Ergebnis eines Kopiervorgangs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CopyTree {
    /// Deskriptoren je Tiefe (0 = Top-Level)
    pub branches: BTreeMap<usize, Vec<Descriptor>>,
}

impl CopyTree {
    pub fn is_empty(&self) -> bool {
        self.branches.values().all(Vec::is_empty)
    }

    /// Anzahl aller Deskriptoren.
    pub fn len(&self) -> usize {
        self.branches.values().map(Vec::len).sum()
    }

    /// Alle Deskriptoren in Einfüge-Reihenfolge (Tiefe aufsteigend).
    pub fn descriptors(&self) -> impl Iterator<Item = &Descriptor> {
        self.branches.values().flatten()
    }

    /// Deskriptor zu einer Original-ID.
    pub fn find(&self, id: &str) -> Option<&Descriptor> {
        self.descriptors().find(|d| d.id.as_str() == id)
    }
}

/// Top-Level einer Selektion: Elemente, deren Parent nicht selbst selektiert ist.
pub fn get_top_level(canvas: &Canvas, elements: &[ElementId]) -> Vec<ElementId> {
    let selected: IndexSet<&ElementId> = elements.iter().collect();
    elements
        .iter()
        .filter(|id| {
            canvas
                .get(id)
                .is_some_and(|e| e.parent.as_ref().map_or(true, |p| !selected.contains(p)))
        })
        .cloned()
        .collect()
}

/// Sammelt Kandidaten mit Tiefe; Duplikate behalten die tiefste Fundstelle.
#[derive(Default)]
struct Candidates {
    entries: IndexMap<ElementId, usize>,
}

impl Candidates {
    fn add(&mut self, id: &ElementId, depth: usize) {
        match self.entries.get(id) {
            None => {
                self.entries.insert(id.clone(), depth);
            }
            // tiefere Fundstelle rückt ans Ende
            Some(&known) if known < depth => {
                self.entries.shift_remove(id);
                self.entries.insert(id.clone(), depth);
            }
            Some(_) => {}
        }
    }

    fn add_with_label(&mut self, canvas: &Canvas, id: &ElementId, depth: usize) {
        if let Some(label) = canvas.get(id).and_then(|e| e.label.clone()) {
            self.add(&label, depth);
        }
        self.add(id, depth);
    }

    fn collect(&mut self, canvas: &Canvas, id: &ElementId, depth: usize) {
        let Some(element) = canvas.get(id) else {
            return;
        };
        // Labels werden nur über ihr Target übernommen
        if element.is_label() {
            return;
        }

        if let Some(label) = &element.label {
            self.add(label, depth);
        }
        let related: Vec<ElementId> = element
            .attachers()
            .iter()
            .chain(element.incoming())
            .chain(element.outgoing())
            .cloned()
            .collect();
        for related in &related {
            self.add_with_label(canvas, related, depth);
        }
        self.add(id, depth);

        for child in element.children.clone() {
            self.collect(canvas, &child, depth + 1);
        }
    }
}

/// Baut den Kopier-Baum einer Selektion.
pub fn create_tree(
    canvas: &Canvas,
    rules: &dyn Rules,
    builders: &[Rc<dyn DescriptorBuilder>],
    elements: &[ElementId],
) -> CopyTree {
    let mut candidates = Candidates::default();
    for id in get_top_level(canvas, elements) {
        candidates.collect(canvas, &id, 0);
    }

    let mut described: Vec<(Descriptor, usize)> = Vec::new();
    for (id, depth) in &candidates.entries {
        let Some(element) = canvas.get(id) else {
            continue;
        };
        let Some(mut descriptor) = Descriptor::from_element(element) else {
            continue;
        };
        descriptor.parent = element
            .parent
            .clone()
            .filter(|p| candidates.entries.contains_key(p));
        for builder in builders {
            builder.describe(canvas, element, &mut descriptor);
        }
        described.push((descriptor, *depth));
    }
    described.sort_by_key(|(descriptor, _)| descriptor.priority);

    // Prioritätsreihenfolge: Endpunkte, Hosts und Targets sind vor ihren
    // Abhängigen entschieden. Die Regel sieht nur bereits übernommene IDs.
    let mut accepted: IndexSet<ElementId> = IndexSet::with_capacity(described.len());
    let mut kept: Vec<(Descriptor, usize)> = Vec::new();
    for (descriptor, depth) in described {
        if !has_relations(&descriptor, &accepted) {
            log::debug!("Kopieren: '{}' ohne kopierte Relationen verworfen", descriptor.id);
            continue;
        }
        accepted.insert(descriptor.id.clone());
        let verdict = rules.allowed(
            rules::ELEMENT_COPY,
            &RuleContext::ElementCopy {
                element: &descriptor.id,
                elements: &accepted,
            },
            canvas,
        );
        if verdict == Allowed::No {
            log::debug!("Kopieren: '{}' verworfen", descriptor.id);
            accepted.pop();
            continue;
        }
        kept.push((descriptor, depth));
    }

    assign_deltas(&mut kept);

    let mut tree = CopyTree::default();
    for (descriptor, depth) in kept {
        tree.branches.entry(depth).or_default().push(descriptor);
    }
    tree
}

fn has_relations(descriptor: &Descriptor, accepted: &IndexSet<ElementId>) -> bool {
    match &descriptor.geometry {
        DescriptorGeometry::Connection { source, target, .. } => {
            accepted.contains(source) && accepted.contains(target)
        }
        DescriptorGeometry::Label { label_target, .. } => accepted.contains(label_target),
        DescriptorGeometry::Shape { .. } => true,
    }
}

/// Anker eines Label-Targets: linke obere Ecke bzw. erster Wegpunkt.
pub(crate) fn target_anchor(descriptor: &Descriptor) -> Option<Vec2> {
    match &descriptor.geometry {
        DescriptorGeometry::Shape { bounds, .. } | DescriptorGeometry::Label { bounds, .. } => {
            Some(bounds.position())
        }
        DescriptorGeometry::Connection { waypoints, .. } => waypoints.first().map(|wp| wp.point),
    }
}

fn assign_deltas(kept: &mut [(Descriptor, usize)]) {
    let Some(bbox) = bounding_box(kept.iter().filter_map(|(d, _)| d.outline())) else {
        return;
    };
    let center = bbox.center();

    let anchors: IndexMap<ElementId, Vec2> = kept
        .iter()
        .filter_map(|(d, _)| target_anchor(d).map(|anchor| (d.id.clone(), anchor)))
        .collect();

    for (descriptor, _) in kept.iter_mut() {
        descriptor.delta = match &descriptor.geometry {
            DescriptorGeometry::Shape { bounds, .. } => Some(CopyDelta::Center(bounds.position() - center)),
            DescriptorGeometry::Label {
                bounds,
                label_target,
            } => Some(match anchors.get(label_target) {
                Some(anchor) => CopyDelta::Target(bounds.position() - *anchor),
                None => CopyDelta::Center(bounds.position() - center),
            }),
            DescriptorGeometry::Connection { waypoints, .. } => Some(CopyDelta::Waypoints(
                waypoints.iter().map(|wp| wp.point - center).collect(),
            )),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::copy_paste::descriptor::PRIORITY_CONNECTION;
    use crate::core::{Bounds, Element, Waypoint};
    use crate::rules::RuleProvider;

    fn canvas_with_host() -> Canvas {
        let mut canvas = Canvas::headless();
        let root = canvas.get_root_element().expect("Root erwartet");
        canvas
            .add_shape(Element::shape("host", "task", Bounds::new(100.0, 100.0, 100.0, 80.0)), &root, None)
            .expect("host");
        let mut attacher = Element::shape("att", "event", Bounds::new(182.0, 162.0, 36.0, 36.0));
        if let Some(data) = attacher.shape_data_mut() {
            data.host = Some(ElementId::from("host"));
        }
        canvas.add_shape(attacher, &root, None).expect("att");
        canvas
            .add_shape(Element::shape("other", "task", Bounds::new(400.0, 100.0, 100.0, 80.0)), &root, None)
            .expect("other");
        canvas
            .add_connection(
                Element::connection(
                    "flow",
                    "flow",
                    "att",
                    "other",
                    vec![Waypoint::new(200.0, 180.0), Waypoint::new(400.0, 140.0)],
                ),
                &root,
                None,
            )
            .expect("flow");
        canvas
    }

    #[test]
    fn tree_pulls_in_attachers_sorted_by_priority() {
        let canvas = canvas_with_host();
        let tree = create_tree(&canvas, &RuleProvider::new(), &[], &[ElementId::from("host")]);

        let ids: Vec<&str> = tree.descriptors().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["host", "att"]);
        // Connections des Attachers werden nicht mitgenommen
        assert!(tree.find("flow").is_none());
    }

    #[test]
    fn connection_survives_only_with_both_endpoints() {
        let canvas = canvas_with_host();
        let selection = [
            ElementId::from("host"),
            ElementId::from("other"),
            ElementId::from("flow"),
        ];
        let tree = create_tree(&canvas, &RuleProvider::new(), &[], &selection);
        let flow = tree.find("flow").expect("Connection erwartet");
        assert_eq!(flow.priority, PRIORITY_CONNECTION);
        assert!(matches!(flow.delta, Some(CopyDelta::Waypoints(ref d)) if d.len() == 2));

        let rules = RuleProvider::new().with_rule(&[rules::ELEMENT_COPY], 1000, |ctx, _| match ctx {
            RuleContext::ElementCopy { element, .. } if element.as_str() == "other" => Allowed::No,
            _ => Allowed::DontCare,
        });
        let tree = create_tree(&canvas, &rules, &[], &selection);
        assert!(tree.find("other").is_none());
        assert!(tree.find("flow").is_none());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn deltas_are_relative_to_bbox_center() {
        let canvas = canvas_with_host();
        let tree = create_tree(&canvas, &RuleProvider::new(), &[], &[ElementId::from("host")]);

        // BBox: (100,100) bis (218,198) → Mittelpunkt (159,149)
        let host = tree.find("host").expect("host");
        assert_eq!(host.delta, Some(CopyDelta::Center(Vec2::new(-59.0, -49.0))));
        let att = tree.find("att").expect("att");
        assert_eq!(att.delta, Some(CopyDelta::Center(Vec2::new(23.0, 13.0))));
    }

    #[test]
    fn copy_rule_sees_only_accepted_elements() {
        let canvas = canvas_with_host();
        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        // Host nur ohne Attacher im Kontext, Attacher nur mit Host
        let rules = RuleProvider::new().with_rule(&[rules::ELEMENT_COPY], 1000, move |ctx, _| match ctx {
            RuleContext::ElementCopy { element, elements } => {
                let ids: Vec<String> = elements.iter().map(|id| id.to_string()).collect();
                log.borrow_mut().push((element.to_string(), ids));
                let rejected = match element.as_str() {
                    "host" => elements.contains("att"),
                    "att" => !elements.contains("host"),
                    _ => false,
                };
                if rejected {
                    Allowed::No
                } else {
                    Allowed::DontCare
                }
            }
            _ => Allowed::DontCare,
        });

        let tree = create_tree(&canvas, &rules, &[], &[ElementId::from("host")]);

        assert_eq!(tree.len(), 2);
        assert_eq!(
            *seen.borrow(),
            vec![
                ("host".to_string(), vec!["host".to_string()]),
                ("att".to_string(), vec!["host".to_string(), "att".to_string()]),
            ]
        );
    }

    #[test]
    fn rejected_host_is_missing_from_attacher_context() {
        let canvas = canvas_with_host();
        let rules = RuleProvider::new().with_rule(&[rules::ELEMENT_COPY], 1000, |ctx, _| match ctx {
            RuleContext::ElementCopy { element, .. } if element.as_str() == "host" => Allowed::No,
            RuleContext::ElementCopy { element, elements }
                if element.as_str() == "att" && !elements.contains("host") =>
            {
                Allowed::No
            }
            _ => Allowed::DontCare,
        });

        let tree = create_tree(&canvas, &rules, &[], &[ElementId::from("host")]);
        assert!(tree.is_empty());
    }

    #[test]
    fn deepest_occurrence_wins_for_duplicates() {
        let mut candidates = Candidates::default();
        candidates.add(&ElementId::from("a"), 0);
        candidates.add(&ElementId::from("b"), 0);
        candidates.add(&ElementId::from("a"), 2);
        candidates.add(&ElementId::from("b"), 1);
        candidates.add(&ElementId::from("a"), 1);

        let entries: Vec<(&str, usize)> = candidates
            .entries
            .iter()
            .map(|(id, depth)| (id.as_str(), *depth))
            .collect();
        assert_eq!(entries, vec![("a", 2), ("b", 1)]);
    }
}
