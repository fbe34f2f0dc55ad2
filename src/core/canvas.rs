//! Canvas: Registry, Root-Ebenen und die strukturellen Primitive.
//!
//! Alle Primitive prüfen ihre Vorbedingungen vollständig, bevor sie etwas
//! verändern. Beidseitige Referenzen (parent/children, label/label_target,
//! host/attachers, source/target ↔ outgoing/incoming) werden hier und nur hier
//! symmetrisch gepflegt.

use super::element::{
    collection_add, collection_remove, ConnectionData, Element, ElementId, ElementKind, ShapeData,
};
use super::event_bus::{EventBus, EventPayload, Handled};
use super::graphics::{Graphics, GraphicsFactory, HeadlessGraphics};
use super::registry::ElementRegistry;
use crate::error::ModelingError;
use serde::Serialize;

/// Zeichenebene eines Root-Elements.
#[derive(Debug, Clone)]
struct Plane {
    root: ElementId,
    layer: String,
    visible: bool,
}

/// Serialisierbarer Schnappschuss des Diagramms.
#[derive(Debug, Clone, Serialize)]
pub struct DiagramSnapshot {
    pub root: Option<ElementId>,
    pub elements: Vec<Element>,
}

/// Container für alle Elemente einer Diagramm-Session.
pub struct Canvas {
    registry: ElementRegistry,
    event_bus: EventBus,
    graphics: Box<dyn GraphicsFactory>,
    surface: Graphics,
    planes: Vec<Plane>,
    root_element: Option<ElementId>,
    /// Zähler für Root-Ebenen (implizite IDs und Layer-Namen)
    roots_idx: usize,
    /// Wurde jemals ein Root explizit hinzugefügt?
    explicit_roots: bool,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("elements", &self.registry.len())
            .field("planes", &self.planes.len())
            .field("root_element", &self.root_element)
            .finish()
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::headless()
    }
}

impl Canvas {
    /// Erstellt ein Canvas mit der gegebenen Grafik-Factory.
    pub fn new(mut graphics: Box<dyn GraphicsFactory>) -> Self {
        let surface = graphics.surface();
        Self {
            registry: ElementRegistry::new(),
            event_bus: EventBus::new(),
            graphics,
            surface,
            planes: Vec::new(),
            root_element: None,
            roots_idx: 0,
            explicit_roots: false,
        }
    }

    /// Canvas ohne Grafik-Ausgabe.
    pub fn headless() -> Self {
        Self::new(Box::new(HeadlessGraphics::default()))
    }

    // ── Zugriff ────────────────────────────────────────────────────

    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    pub fn event_bus_mut(&mut self) -> &mut EventBus {
        &mut self.event_bus
    }

    /// Verteilt ein Event über den Event-Bus des Canvas.
    pub fn fire(&mut self, name: &str, payload: EventPayload) -> Handled {
        self.event_bus.fire(name, payload)
    }

    /// Element zu einer ID (ohne Fehler).
    pub fn get(&self, id: &str) -> Option<&Element> {
        self.registry.get(id)
    }

    /// Element zu einer ID.
    pub fn element(&self, id: &str) -> Result<&Element, ModelingError> {
        self.registry
            .get(id)
            .ok_or_else(|| ModelingError::ElementNotFound(id.into()))
    }

    pub(crate) fn element_mut(&mut self, id: &str) -> Result<&mut Element, ModelingError> {
        self.registry
            .get_mut(id)
            .ok_or_else(|| ModelingError::ElementNotFound(id.into()))
    }

    /// Shape-Daten eines Elements.
    pub fn shape(&self, id: &str) -> Result<&ShapeData, ModelingError> {
        self.element(id)?
            .shape_data()
            .ok_or_else(|| unexpected(id, "Shape"))
    }

    pub(crate) fn shape_mut(&mut self, id: &str) -> Result<&mut ShapeData, ModelingError> {
        self.element_mut(id)?
            .shape_data_mut()
            .ok_or_else(|| unexpected(id, "Shape"))
    }

    /// Connection-Daten eines Elements.
    pub fn connection(&self, id: &str) -> Result<&ConnectionData, ModelingError> {
        self.element(id)?
            .connection_data()
            .ok_or_else(|| unexpected(id, "Connection"))
    }

    pub(crate) fn connection_mut(&mut self, id: &str) -> Result<&mut ConnectionData, ModelingError> {
        self.element_mut(id)?
            .connection_data_mut()
            .ok_or_else(|| unexpected(id, "Connection"))
    }

    /// Index eines Elements in der Kinder-Liste seines Parents.
    pub fn index_in_parent(&self, id: &str) -> Option<usize> {
        let parent = self.registry.get(id)?.parent.as_ref()?;
        self.registry
            .get(parent)?
            .children
            .iter()
            .position(|child| child.as_str() == id)
    }

    /// Schnappschuss aller Elemente in Registrierungs-Reihenfolge.
    pub fn snapshot(&self) -> DiagramSnapshot {
        DiagramSnapshot {
            root: self.root_element.clone(),
            elements: self.registry.elements().cloned().collect(),
        }
    }

    // ── Root-Ebenen ────────────────────────────────────────────────

    /// Fügt ein Root-Element als neue Ebene hinzu (`None` = implizites Root).
    pub fn add_root_element(&mut self, root: Option<Element>) -> Result<ElementId, ModelingError> {
        let idx = self.roots_idx;
        let explicit = root.is_some();
        let root = match root {
            Some(root) if !root.is_root() => return Err(unexpected(&root.id, "Root")),
            Some(root) => root,
            None => Element::root(format!("__implicitroot_{idx}")),
        };
        self.registry.ensure_free(&root.id)?;

        self.roots_idx += 1;
        if explicit {
            self.explicit_roots = true;
        }

        let id = root.id.clone();
        self.event_bus.fire(
            "root.add",
            EventPayload::Element {
                id: id.clone(),
                graphics: None,
            },
        );
        let graphics = self.graphics.create(&root);
        self.registry.add(root, graphics, None)?;
        self.planes.push(Plane {
            root: id.clone(),
            layer: format!("root-{idx}"),
            visible: false,
        });
        self.event_bus.fire(
            "root.added",
            EventPayload::Element {
                id: id.clone(),
                graphics: Some(graphics),
            },
        );

        log::debug!("Root-Ebene '{}' hinzugefügt", id);
        Ok(id)
    }

    /// Entfernt ein Root-Element samt Ebene. Das Root darf keine Kinder mehr haben.
    pub fn remove_root_element(&mut self, id: &str) -> Result<Element, ModelingError> {
        let root = self.element(id)?;
        if !root.is_root() {
            return Err(unexpected(id, "Root"));
        }
        if !root.children.is_empty() {
            return Err(ModelingError::ElementInUse(id.into()));
        }

        self.event_bus.fire(
            "root.remove",
            EventPayload::Element {
                id: id.into(),
                graphics: None,
            },
        );
        if self.root_element.as_deref() == Some(id) {
            self.registry.set_secondary_graphics(id, None);
            self.root_element = None;
        }
        self.planes.retain(|plane| plane.root.as_str() != id);

        let entry = self
            .registry
            .remove(id)
            .ok_or_else(|| ModelingError::ElementNotFound(id.into()))?;
        self.graphics.remove(&entry.element, entry.graphics);
        self.event_bus.fire(
            "root.removed",
            EventPayload::Element {
                id: id.into(),
                graphics: None,
            },
        );
        Ok(entry.element)
    }

    /// Aktiviert eine Root-Ebene.
    ///
    /// Die Zeichenfläche wird vom bisherigen Root gelöst (Ebene ausgeblendet)
    /// und dem neuen Root als Sekundär-Grafik zugeordnet.
    pub fn set_root_element(&mut self, id: &str) -> Result<(), ModelingError> {
        if !self.element(id)?.is_root() {
            return Err(unexpected(id, "Root"));
        }
        if self.root_element.as_deref() == Some(id) {
            return Ok(());
        }

        if let Some(current) = self.root_element.take() {
            self.registry.set_secondary_graphics(&current, None);
            if let Some(plane) = self.planes.iter_mut().find(|p| p.root == current) {
                plane.visible = false;
            }
        }

        self.registry.set_secondary_graphics(id, Some(self.surface));
        if let Some(plane) = self.planes.iter_mut().find(|p| p.root.as_str() == id) {
            plane.visible = true;
        }
        self.root_element = Some(id.into());

        self.event_bus.fire(
            "root.set",
            EventPayload::Element {
                id: id.into(),
                graphics: Some(self.surface),
            },
        );
        log::debug!("Root-Ebene '{}' aktiviert", id);
        Ok(())
    }

    /// Aktives Root-Element.
    ///
    /// Wurde noch nie ein Root explizit hinzugefügt und existiert keine Ebene,
    /// wird einmalig ein implizites Root angelegt und aktiviert.
    pub fn get_root_element(&mut self) -> Option<ElementId> {
        if self.root_element.is_none() && self.planes.is_empty() && !self.explicit_roots {
            let created = self
                .add_root_element(None)
                .and_then(|id| self.set_root_element(&id));
            if let Err(err) = created {
                log::warn!("Implizites Root konnte nicht angelegt werden: {}", err);
            }
        }
        self.root_element.clone()
    }

    /// Aktives Root-Element ohne implizites Anlegen.
    pub fn root_element(&self) -> Option<&ElementId> {
        self.root_element.as_ref()
    }

    /// Alle Root-Elemente in Ebenen-Reihenfolge.
    pub fn root_elements(&self) -> impl Iterator<Item = &ElementId> {
        self.planes.iter().map(|plane| &plane.root)
    }

    /// Layer-Name einer Root-Ebene.
    pub fn layer_name(&self, root: &str) -> Option<&str> {
        self.planes
            .iter()
            .find(|plane| plane.root.as_str() == root)
            .map(|plane| plane.layer.as_str())
    }

    /// Sichtbarkeit der Ebene eines Roots.
    pub fn is_layer_visible(&self, root: &str) -> bool {
        self.planes
            .iter()
            .any(|plane| plane.root.as_str() == root && plane.visible)
    }

    // ── Strukturelle Primitive ─────────────────────────────────────

    /// Prüft, dass `id` existiert und Kinder aufnehmen kann.
    fn ensure_container(&self, id: &str) -> Result<(), ModelingError> {
        if self.element(id)?.is_connection() {
            return Err(unexpected(id, "Container"));
        }
        Ok(())
    }

    /// Neue Elemente dürfen noch keine Rückverweise tragen.
    fn ensure_unlinked(element: &Element) -> Result<(), ModelingError> {
        let linked = !element.children.is_empty()
            || element.label.is_some()
            || !element.attachers().is_empty()
            || element.connections().next().is_some();
        if linked {
            return Err(ModelingError::ElementInUse(element.id.clone()));
        }
        Ok(())
    }

    /// Registriert ein Shape (oder Label) unter `parent`.
    ///
    /// `label_target` und `host` des Elements werden beidseitig verknüpft.
    pub(crate) fn add_shape(
        &mut self,
        mut element: Element,
        parent: &str,
        index: Option<usize>,
    ) -> Result<(), ModelingError> {
        if !element.is_shape() {
            return Err(unexpected(&element.id, "Shape"));
        }
        self.registry.ensure_free(&element.id)?;
        self.ensure_container(parent)?;
        Self::ensure_unlinked(&element)?;

        let id = element.id.clone();
        let label_target = element.label_target().cloned();
        let host = element.host().cloned();

        if let Some(target) = &label_target {
            let target_element = self.element(target)?;
            if target_element.is_root() {
                return Err(unexpected(target, "Shape oder Connection"));
            }
            if let Some(existing) = target_element.label.as_ref().filter(|l| **l != id) {
                return Err(ModelingError::LabelAlreadyPresent {
                    target: target.clone(),
                    label: existing.clone(),
                });
            }
        }
        if let Some(host) = &host {
            self.shape(host)?;
        }

        element.parent = Some(parent.into());
        collection_add(&mut self.element_mut(parent)?.children, &id, index);
        if let Some(target) = &label_target {
            self.element_mut(target)?.label = Some(id.clone());
        }
        if let Some(host) = &host {
            collection_add(&mut self.shape_mut(host)?.attachers, &id, None);
        }

        self.register(element, "shape")
    }

    /// Registriert eine Connection unter `parent` und verknüpft Source/Target.
    pub(crate) fn add_connection(
        &mut self,
        mut element: Element,
        parent: &str,
        index: Option<usize>,
    ) -> Result<(), ModelingError> {
        let Some(data) = element.connection_data() else {
            return Err(unexpected(&element.id, "Connection"));
        };
        let id = element.id.clone();
        let source = data.source.clone();
        let target = data.target.clone();

        self.registry.ensure_free(&id)?;
        self.ensure_container(parent)?;
        Self::ensure_unlinked(&element)?;
        if self.shape(&source).is_err() || self.shape(&target).is_err() {
            return Err(ModelingError::MissingEndpoint(id));
        }

        element.parent = Some(parent.into());
        collection_add(&mut self.element_mut(parent)?.children, &id, index);
        collection_add(&mut self.shape_mut(&source)?.outgoing, &id, None);
        collection_add(&mut self.shape_mut(&target)?.incoming, &id, None);

        self.register(element, "connection")
    }

    fn register(&mut self, element: Element, kind: &str) -> Result<(), ModelingError> {
        let id = element.id.clone();
        self.event_bus.fire(
            &format!("{kind}.add"),
            EventPayload::Element {
                id: id.clone(),
                graphics: None,
            },
        );
        let graphics = self.graphics.create(&element);
        self.registry.add(element, graphics, None)?;
        self.event_bus.fire(
            &format!("{kind}.added"),
            EventPayload::Element {
                id,
                graphics: Some(graphics),
            },
        );
        Ok(())
    }

    /// Meldet ein Shape ab und löst es aus Parent, Host und Label-Target.
    ///
    /// Das zurückgegebene Element behält `parent`, `host` und `label_target`,
    /// damit es unverändert wieder hinzugefügt werden kann.
    pub(crate) fn remove_shape(&mut self, id: &str) -> Result<Element, ModelingError> {
        let element = self.element(id)?;
        if !element.is_shape() {
            return Err(unexpected(id, "Shape"));
        }
        let in_use = !element.children.is_empty()
            || element.label.is_some()
            || !element.attachers().is_empty()
            || element.connections().next().is_some();
        if in_use {
            return Err(ModelingError::ElementInUse(id.into()));
        }

        let parent = element.parent.clone();
        let host = element.host().cloned();
        let label_target = element.label_target().cloned();

        if let Some(parent) = &parent {
            if let Ok(parent) = self.element_mut(parent) {
                collection_remove(&mut parent.children, id);
            }
        }
        if let Some(host) = &host {
            if let Ok(host) = self.shape_mut(host) {
                collection_remove(&mut host.attachers, id);
            }
        }
        if let Some(target) = &label_target {
            if let Ok(target) = self.element_mut(target) {
                if target.label.as_deref() == Some(id) {
                    target.label = None;
                }
            }
        }

        self.unregister(id, "shape")
    }

    /// Meldet eine Connection ab und löst sie aus Parent, Source und Target.
    pub(crate) fn remove_connection(&mut self, id: &str) -> Result<Element, ModelingError> {
        let element = self.element(id)?;
        let Some(data) = element.connection_data() else {
            return Err(unexpected(id, "Connection"));
        };
        if element.label.is_some() || !element.children.is_empty() {
            return Err(ModelingError::ElementInUse(id.into()));
        }

        let parent = element.parent.clone();
        let source = data.source.clone();
        let target = data.target.clone();

        if let Some(parent) = &parent {
            if let Ok(parent) = self.element_mut(parent) {
                collection_remove(&mut parent.children, id);
            }
        }
        if let Ok(source) = self.shape_mut(&source) {
            collection_remove(&mut source.outgoing, id);
        }
        if let Ok(target) = self.shape_mut(&target) {
            collection_remove(&mut target.incoming, id);
        }

        self.unregister(id, "connection")
    }

    fn unregister(&mut self, id: &str, kind: &str) -> Result<Element, ModelingError> {
        self.event_bus.fire(
            &format!("{kind}.remove"),
            EventPayload::Element {
                id: id.into(),
                graphics: self.registry.get_graphics(id, false),
            },
        );
        let entry = self
            .registry
            .remove(id)
            .ok_or_else(|| ModelingError::ElementNotFound(id.into()))?;
        self.graphics.remove(&entry.element, entry.graphics);
        self.event_bus.fire(
            &format!("{kind}.removed"),
            EventPayload::Element {
                id: id.into(),
                graphics: None,
            },
        );
        Ok(entry.element)
    }

    /// Hängt ein Element unter einen neuen Parent.
    ///
    /// Gibt den alten Parent und den alten Index zurück.
    pub(crate) fn set_parent(
        &mut self,
        id: &str,
        new_parent: &str,
        index: Option<usize>,
    ) -> Result<(Option<ElementId>, Option<usize>), ModelingError> {
        self.element(id)?;
        self.ensure_container(new_parent)?;

        // Zyklen verhindern: neuer Parent darf nicht im eigenen Teilbaum liegen
        let mut cursor = Some(ElementId::from(new_parent));
        while let Some(current) = cursor {
            if current.as_str() == id {
                return Err(unexpected(new_parent, "Parent außerhalb des eigenen Teilbaums"));
            }
            cursor = self.registry.get(&current).and_then(|e| e.parent.clone());
        }

        let old_parent = self.element(id)?.parent.clone();
        let old_index = match &old_parent {
            Some(parent) => self
                .element_mut(parent)
                .ok()
                .and_then(|parent| collection_remove(&mut parent.children, id)),
            None => None,
        };

        let id_owned = ElementId::from(id);
        collection_add(&mut self.element_mut(new_parent)?.children, &id_owned, index);
        self.element_mut(id)?.parent = Some(new_parent.into());

        Ok((old_parent, old_index))
    }

    /// Setzt oder löst den Host eines Shapes.
    ///
    /// Gibt den alten Host und den alten Index in dessen Attacher-Liste zurück.
    pub(crate) fn set_host(
        &mut self,
        id: &str,
        new_host: Option<&str>,
        index: Option<usize>,
    ) -> Result<(Option<ElementId>, Option<usize>), ModelingError> {
        self.shape(id)?;
        if let Some(host) = new_host {
            if host == id {
                return Err(unexpected(host, "fremder Host"));
            }
            self.shape(host)?;
        }

        let old_host = self.shape(id)?.host.clone();
        let old_index = match &old_host {
            Some(host) => self
                .shape_mut(host)
                .ok()
                .and_then(|host| collection_remove(&mut host.attachers, id)),
            None => None,
        };

        let id_owned = ElementId::from(id);
        if let Some(host) = new_host {
            collection_add(&mut self.shape_mut(host)?.attachers, &id_owned, index);
        }
        self.shape_mut(id)?.host = new_host.map(ElementId::from);

        Ok((old_host, old_index))
    }

    /// Setzt Source und Target einer Connection neu.
    ///
    /// Gibt die alte Source und das alte Target zurück.
    pub(crate) fn set_endpoints(
        &mut self,
        id: &str,
        source: &str,
        target: &str,
    ) -> Result<(ElementId, ElementId), ModelingError> {
        let data = self.connection(id)?;
        let old_source = data.source.clone();
        let old_target = data.target.clone();
        if self.shape(source).is_err() || self.shape(target).is_err() {
            return Err(ModelingError::MissingEndpoint(id.into()));
        }

        let id_owned = ElementId::from(id);
        if old_source.as_str() != source {
            if let Ok(old) = self.shape_mut(&old_source) {
                collection_remove(&mut old.outgoing, id);
            }
            collection_add(&mut self.shape_mut(source)?.outgoing, &id_owned, None);
        }
        if old_target.as_str() != target {
            if let Ok(old) = self.shape_mut(&old_target) {
                collection_remove(&mut old.incoming, id);
            }
            collection_add(&mut self.shape_mut(target)?.incoming, &id_owned, None);
        }

        let data = self.connection_mut(id)?;
        data.source = source.into();
        data.target = target.into();
        Ok((old_source, old_target))
    }

    /// Benennt ein Element um und schreibt alle Referenzen darauf um.
    pub fn update_id(&mut self, id: &str, new_id: impl Into<ElementId>) -> Result<(), ModelingError> {
        let new_id = new_id.into();
        self.registry.update_id(id, &new_id)?;

        for element in self.registry.elements_mut() {
            rename_opt(&mut element.parent, id, &new_id);
            rename_opt(&mut element.label, id, &new_id);
            rename_all(&mut element.children, id, &new_id);
            match &mut element.kind {
                ElementKind::Root => {}
                ElementKind::Shape(data) => {
                    rename_opt(&mut data.host, id, &new_id);
                    rename_opt(&mut data.label_target, id, &new_id);
                    rename_all(&mut data.attachers, id, &new_id);
                    rename_all(&mut data.incoming, id, &new_id);
                    rename_all(&mut data.outgoing, id, &new_id);
                }
                ElementKind::Connection(data) => {
                    rename(&mut data.source, id, &new_id);
                    rename(&mut data.target, id, &new_id);
                }
            }
        }
        for plane in &mut self.planes {
            rename(&mut plane.root, id, &new_id);
        }
        rename_opt(&mut self.root_element, id, &new_id);

        log::debug!("Element '{}' umbenannt in '{}'", id, new_id);
        Ok(())
    }

    /// Zeichnet geänderte Elemente neu und verteilt die Change-Events.
    pub(crate) fn mark_changed(&mut self, ids: &[ElementId]) {
        let mut changed: Vec<ElementId> = Vec::new();

        for id in ids {
            if changed.contains(id) {
                continue;
            }
            let (Some(element), Some(graphics)) =
                (self.registry.get(id), self.registry.get_graphics(id, false))
            else {
                continue;
            };
            self.graphics.update(element, graphics);
            let event = format!("{}.changed", element.kind_name());
            self.event_bus.fire(
                &event,
                EventPayload::Element {
                    id: id.clone(),
                    graphics: Some(graphics),
                },
            );
            changed.push(id.clone());
        }

        if !changed.is_empty() {
            self.event_bus
                .fire("elements.changed", EventPayload::Elements { ids: changed });
        }
    }

    /// Alle Referenzen auf nicht registrierte Elemente als (Element, Ziel)-Paare.
    pub fn dangling_references(&self) -> Vec<(ElementId, ElementId)> {
        let mut dangling = Vec::new();
        for element in self.registry.elements() {
            let mut check = |target: &ElementId| {
                if !self.registry.contains(target) {
                    dangling.push((element.id.clone(), target.clone()));
                }
            };
            element.parent.iter().for_each(&mut check);
            element.label.iter().for_each(&mut check);
            element.children.iter().for_each(&mut check);
            match &element.kind {
                ElementKind::Root => {}
                ElementKind::Shape(data) => {
                    data.host.iter().for_each(&mut check);
                    data.label_target.iter().for_each(&mut check);
                    data.attachers.iter().for_each(&mut check);
                    data.incoming.iter().for_each(&mut check);
                    data.outgoing.iter().for_each(&mut check);
                }
                ElementKind::Connection(data) => {
                    check(&data.source);
                    check(&data.target);
                }
            }
        }
        dangling
    }
}

fn unexpected(id: &str, expected: &'static str) -> ModelingError {
    ModelingError::UnexpectedKind {
        id: id.into(),
        expected,
    }
}

fn rename(slot: &mut ElementId, old: &str, new: &ElementId) {
    if slot.as_str() == old {
        *slot = new.clone();
    }
}

fn rename_opt(slot: &mut Option<ElementId>, old: &str, new: &ElementId) {
    if let Some(slot) = slot.as_mut() {
        rename(slot, old, new);
    }
}

fn rename_all(slots: &mut [ElementId], old: &str, new: &ElementId) {
    for slot in slots {
        rename(slot, old, new);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Bounds;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn canvas_with_root() -> (Canvas, ElementId) {
        let mut canvas = Canvas::headless();
        let root = canvas.get_root_element().expect("implizites Root erwartet");
        (canvas, root)
    }

    fn task(id: &str, x: f32, y: f32) -> Element {
        Element::shape(id, "task", Bounds::new(x, y, 100.0, 80.0))
    }

    #[test]
    fn implicit_root_is_created_once() {
        let mut canvas = Canvas::headless();
        let root = canvas.get_root_element().expect("Root erwartet");
        assert_eq!(root.as_str(), "__implicitroot_0");
        assert_eq!(canvas.layer_name(&root), Some("root-0"));
        assert!(canvas.is_layer_visible(&root));
        assert_eq!(canvas.get_root_element(), Some(root));
    }

    #[test]
    fn explicit_root_suppresses_implicit_root() {
        let mut canvas = Canvas::headless();
        let root = canvas
            .add_root_element(Some(Element::root("main")))
            .expect("Root hinzufügen erwartet");
        assert_eq!(canvas.get_root_element(), None);

        canvas.set_root_element(&root).expect("Root aktivieren erwartet");
        assert_eq!(canvas.get_root_element(), Some(root));
    }

    #[test]
    fn switching_roots_moves_surface_and_visibility() {
        let mut canvas = Canvas::headless();
        let a = canvas
            .add_root_element(Some(Element::root("a")))
            .expect("Root a");
        let b = canvas
            .add_root_element(Some(Element::root("b")))
            .expect("Root b");

        canvas.set_root_element(&a).expect("a aktivieren");
        let surface = canvas.registry().get_graphics(&a, true);
        assert!(surface.is_some());

        canvas.set_root_element(&b).expect("b aktivieren");
        assert_eq!(canvas.registry().get_graphics(&a, true), None);
        assert_eq!(canvas.registry().get_graphics(&b, true), surface);
        assert!(!canvas.is_layer_visible(&a));
        assert!(canvas.is_layer_visible(&b));
        assert_eq!(canvas.layer_name(&b), Some("root-1"));
    }

    #[test]
    fn add_connection_links_both_endpoints() {
        let (mut canvas, root) = canvas_with_root();
        canvas.add_shape(task("a", 0.0, 0.0), &root, None).expect("a");
        canvas.add_shape(task("b", 300.0, 0.0), &root, None).expect("b");
        canvas
            .add_connection(Element::connection("c", "flow", "a", "b", Vec::new()), &root, None)
            .expect("c");

        assert_eq!(canvas.shape("a").map(|s| s.outgoing.clone()), Ok(vec!["c".into()]));
        assert_eq!(canvas.shape("b").map(|s| s.incoming.clone()), Ok(vec!["c".into()]));

        let err = canvas.add_connection(
            Element::connection("d", "flow", "a", "missing", Vec::new()),
            &root,
            None,
        );
        assert_eq!(err, Err(ModelingError::MissingEndpoint("d".into())));
        assert!(canvas.get("d").is_none());
    }

    #[test]
    fn remove_shape_in_use_is_rejected_without_mutation() {
        let (mut canvas, root) = canvas_with_root();
        canvas.add_shape(task("a", 0.0, 0.0), &root, None).expect("a");
        canvas.add_shape(task("b", 300.0, 0.0), &root, None).expect("b");
        canvas
            .add_connection(Element::connection("c", "flow", "a", "b", Vec::new()), &root, None)
            .expect("c");

        assert_eq!(
            canvas.remove_shape("a"),
            Err(ModelingError::ElementInUse("a".into()))
        );
        assert!(canvas.get("a").is_some());

        canvas.remove_connection("c").expect("c entfernen");
        let removed = canvas.remove_shape("a").expect("a entfernen");
        assert_eq!(removed.parent, Some(root.clone()));
        assert_eq!(canvas.element(&root).map(|r| r.children.clone()), Ok(vec!["b".into()]));
    }

    #[test]
    fn label_and_host_are_linked_symmetrically() {
        let (mut canvas, root) = canvas_with_root();
        canvas.add_shape(task("a", 0.0, 0.0), &root, None).expect("a");
        canvas
            .add_shape(
                Element::label("a_label", "label", "a", Bounds::new(0.0, 90.0, 50.0, 20.0)),
                &root,
                None,
            )
            .expect("Label");
        assert_eq!(canvas.element("a").map(|a| a.label.clone()), Ok(Some("a_label".into())));

        let second = canvas.add_shape(
            Element::label("other", "label", "a", Bounds::new(0.0, 0.0, 10.0, 10.0)),
            &root,
            None,
        );
        assert_eq!(
            second,
            Err(ModelingError::LabelAlreadyPresent {
                target: "a".into(),
                label: "a_label".into()
            })
        );

        canvas.add_shape(task("b", 0.0, 0.0), &root, None).expect("b");
        canvas.set_host("b", Some("a"), None).expect("Host setzen");
        assert_eq!(canvas.shape("a").map(|s| s.attachers.clone()), Ok(vec!["b".into()]));

        let (old_host, old_index) = canvas.set_host("b", None, None).expect("Host lösen");
        assert_eq!(old_host, Some("a".into()));
        assert_eq!(old_index, Some(0));
        assert!(canvas.shape("a").map(|s| s.attachers.is_empty()).unwrap_or(false));
    }

    #[test]
    fn set_parent_rejects_cycles() {
        let (mut canvas, root) = canvas_with_root();
        canvas.add_shape(task("outer", 0.0, 0.0), &root, None).expect("outer");
        canvas.add_shape(task("inner", 10.0, 10.0), "outer", None).expect("inner");

        assert!(canvas.set_parent("outer", "inner", None).is_err());
        let (old_parent, old_index) = canvas.set_parent("inner", &root, None).expect("umhängen");
        assert_eq!(old_parent, Some("outer".into()));
        assert_eq!(old_index, Some(0));
    }

    #[test]
    fn update_id_rewrites_references() {
        let (mut canvas, root) = canvas_with_root();
        canvas.add_shape(task("a", 0.0, 0.0), &root, None).expect("a");
        canvas.add_shape(task("b", 300.0, 0.0), &root, None).expect("b");
        canvas
            .add_connection(Element::connection("c", "flow", "a", "b", Vec::new()), &root, None)
            .expect("c");

        canvas.update_id("a", "a2").expect("umbenennen");
        assert_eq!(canvas.connection("c").map(|c| c.source.clone()), Ok("a2".into()));
        assert!(canvas.dangling_references().is_empty());
    }

    #[test]
    fn mark_changed_fires_per_element_and_batch_events() {
        let (mut canvas, root) = canvas_with_root();
        canvas.add_shape(task("a", 0.0, 0.0), &root, None).expect("a");

        let seen = Rc::new(RefCell::new(Vec::new()));
        for name in ["shape.changed", "elements.changed"] {
            let seen = Rc::clone(&seen);
            canvas.event_bus_mut().on(name, 1000, move |event| {
                seen.borrow_mut().push(event.name.clone());
                Handled::Continue
            });
        }

        canvas.mark_changed(&["a".into(), "a".into(), "gone".into()]);
        assert_eq!(*seen.borrow(), vec!["shape.changed", "elements.changed"]);
    }
}
