//! Element-Registry: ID → Element + Grafik-Handles.

use super::element::{Element, ElementId};
use super::graphics::Graphics;
use crate::error::ModelingError;
use indexmap::IndexMap;

/// Registrierter Eintrag mit Primär- und optionaler Sekundär-Grafik.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub element: Element,
    pub graphics: Graphics,
    /// Sekundär-Grafik (Zeichenfläche des aktiven Roots)
    pub secondary_graphics: Option<Graphics>,
}

/// Zentrale Element-Registry in Einfüge-Reihenfolge.
#[derive(Debug, Default)]
pub struct ElementRegistry {
    entries: IndexMap<ElementId, RegistryEntry>,
}

impl ElementRegistry {
    /// Erstellt eine leere Registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prüft, ob `id` registriert werden darf (nicht leer, noch frei).
    pub fn ensure_free(&self, id: &str) -> Result<(), ModelingError> {
        if id.is_empty() {
            return Err(ModelingError::MissingId);
        }
        if self.entries.contains_key(id) {
            return Err(ModelingError::DuplicateId(id.into()));
        }
        Ok(())
    }

    /// Registriert ein Element mit seinen Grafiken.
    pub fn add(
        &mut self,
        element: Element,
        graphics: Graphics,
        secondary_graphics: Option<Graphics>,
    ) -> Result<(), ModelingError> {
        self.ensure_free(&element.id)?;
        self.entries.insert(
            element.id.clone(),
            RegistryEntry {
                element,
                graphics,
                secondary_graphics,
            },
        );
        Ok(())
    }

    /// Meldet ein Element ab; die Reihenfolge der übrigen bleibt erhalten.
    pub fn remove(&mut self, id: &str) -> Option<RegistryEntry> {
        self.entries.shift_remove(id)
    }

    /// Element zu einer ID.
    pub fn get(&self, id: &str) -> Option<&Element> {
        self.entries.get(id).map(|entry| &entry.element)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.entries.get_mut(id).map(|entry| &mut entry.element)
    }

    /// Prüft ob eine ID registriert ist.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Benennt einen Eintrag um (Position in der Reihenfolge bleibt erhalten).
    ///
    /// Referenzen anderer Elemente werden hier NICHT umgeschrieben, das
    /// übernimmt `Canvas::update_id`.
    pub fn update_id(&mut self, id: &str, new_id: &ElementId) -> Result<(), ModelingError> {
        if !self.entries.contains_key(id) {
            return Err(ModelingError::ElementNotFound(id.into()));
        }
        self.ensure_free(new_id)?;

        let Some((index, _, mut entry)) = self.entries.shift_remove_full(id) else {
            return Err(ModelingError::ElementNotFound(id.into()));
        };
        entry.element.id = new_id.clone();
        self.entries.shift_insert(index, new_id.clone(), entry);
        Ok(())
    }

    /// Alle Elemente, die das Prädikat erfüllen.
    pub fn filter<F>(&self, mut predicate: F) -> Vec<&Element>
    where
        F: FnMut(&Element) -> bool,
    {
        self.entries
            .values()
            .map(|entry| &entry.element)
            .filter(|element| predicate(element))
            .collect()
    }

    /// Ruft `f` für jedes Element auf.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&Element),
    {
        for entry in self.entries.values() {
            f(&entry.element);
        }
    }

    /// Grafik-Handle eines Elements (`secondary` = Sekundär-Grafik).
    pub fn get_graphics(&self, id: &str, secondary: bool) -> Option<Graphics> {
        let entry = self.entries.get(id)?;
        if secondary {
            entry.secondary_graphics
        } else {
            Some(entry.graphics)
        }
    }

    /// Sucht das Element zu einem Grafik-Handle.
    pub fn get_by_graphics(&self, graphics: Graphics) -> Option<&Element> {
        self.entries
            .values()
            .find(|entry| entry.graphics == graphics || entry.secondary_graphics == Some(graphics))
            .map(|entry| &entry.element)
    }

    /// Setzt oder entfernt die Sekundär-Grafik eines Eintrags.
    pub(crate) fn set_secondary_graphics(&mut self, id: &str, graphics: Option<Graphics>) {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.secondary_graphics = graphics;
        }
    }

    /// Iterator über alle Elemente in Einfüge-Reihenfolge.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.entries.values().map(|entry| &entry.element)
    }

    pub(crate) fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.entries.values_mut().map(|entry| &mut entry.element)
    }

    /// Anzahl registrierter Elemente.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Prüft ob die Registry leer ist.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Bounds;
    use crate::core::graphics::{GraphicsFactory, HeadlessGraphics};

    fn shape(id: &str) -> Element {
        Element::shape(id, "task", Bounds::new(0.0, 0.0, 10.0, 10.0))
    }

    #[test]
    fn add_rejects_duplicate_and_empty_ids() {
        let mut gfx = HeadlessGraphics::default();
        let mut registry = ElementRegistry::new();
        let a = shape("a");
        let g = gfx.create(&a);
        registry.add(a.clone(), g, None).expect("erstes Einfügen erwartet");

        assert_eq!(
            registry.add(a, g, None),
            Err(ModelingError::DuplicateId("a".into()))
        );
        assert_eq!(
            registry.add(shape(""), g, None),
            Err(ModelingError::MissingId)
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn update_id_keeps_order_and_graphics() {
        let mut gfx = HeadlessGraphics::default();
        let mut registry = ElementRegistry::new();
        for id in ["a", "b", "c"] {
            let element = shape(id);
            let g = gfx.create(&element);
            registry.add(element, g, None).expect("Einfügen erwartet");
        }
        let before = registry.get_graphics("b", false);

        registry
            .update_id("b", &"b2".into())
            .expect("Umbenennen erwartet");

        let ids: Vec<&str> = registry.elements().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b2", "c"]);
        assert_eq!(registry.get_graphics("b2", false), before);
        assert!(registry.get("b").is_none());

        assert_eq!(
            registry.update_id("a", &"c".into()),
            Err(ModelingError::DuplicateId("c".into()))
        );
        assert_eq!(
            registry.update_id("x", &"y".into()),
            Err(ModelingError::ElementNotFound("x".into()))
        );
    }

    #[test]
    fn filter_and_graphics_lookup() {
        let mut gfx = HeadlessGraphics::default();
        let mut registry = ElementRegistry::new();
        let a = shape("a");
        let ga = gfx.create(&a);
        registry.add(a, ga, None).expect("Einfügen erwartet");
        let c = Element::connection("c", "flow", "a", "a", Vec::new());
        let gc = gfx.create(&c);
        registry.add(c, gc, None).expect("Einfügen erwartet");

        let connections = registry.filter(|e| e.is_connection());
        assert_eq!(connections.len(), 1);
        assert_eq!(registry.get_by_graphics(ga).map(|e| e.id.as_str()), Some("a"));
        assert_eq!(registry.get_graphics("a", true), None);
    }
}
