//! Erzeugung neuer Elemente mit fortlaufenden IDs.

use super::element::{Element, ElementId};
use super::geometry::Bounds;

/// Erzeugt Element-Templates mit generierten IDs.
///
/// Die IDs sind nur innerhalb der Factory eindeutig; der `Modeler` prüft
/// zusätzlich gegen die Registry.
#[derive(Debug, Default)]
pub struct ElementFactory {
    next_id: u64,
}

impl ElementFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nächste ID mit Präfix, z.B. `shape_3`.
    pub fn next_id(&mut self, prefix: &str) -> ElementId {
        self.next_id += 1;
        ElementId::new(format!("{}_{}", prefix, self.next_id))
    }

    /// Shape-Template der gegebenen Größe an Position (0, 0).
    pub fn create_shape(&mut self, element_type: &str, width: f32, height: f32) -> Element {
        let id = self.next_id("shape");
        Element::shape(id, element_type, Bounds::new(0.0, 0.0, width, height))
    }

    /// Label-Template für `target`.
    pub fn create_label(&mut self, target: &ElementId, width: f32, height: f32) -> Element {
        let id = self.next_id("label");
        Element::label(id, "label", target.clone(), Bounds::new(0.0, 0.0, width, height))
    }

    /// Connection-Template ohne Wegpunkte.
    pub fn create_connection(
        &mut self,
        element_type: &str,
        source: &ElementId,
        target: &ElementId,
    ) -> Element {
        let id = self.next_id("connection");
        Element::connection(id, element_type, source.clone(), target.clone(), Vec::new())
    }

    /// Root-Template.
    pub fn create_root(&mut self) -> Element {
        let id = self.next_id("root");
        Element::root(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_across_kinds() {
        let mut factory = ElementFactory::new();
        let shape = factory.create_shape("task", 100.0, 80.0);
        let label = factory.create_label(&shape.id, 90.0, 20.0);

        assert_eq!(shape.id.as_str(), "shape_1");
        assert_eq!(label.id.as_str(), "label_2");
        assert_eq!(label.label_target(), Some(&shape.id));
        assert_eq!(shape.bounds(), Some(Bounds::new(0.0, 0.0, 100.0, 80.0)));
    }
}
