//! Move-Closure: alle Elemente, die beim Verschieben einer Selektion betroffen sind.
//!
//! - `all_shapes`: selektierte Shapes samt aller Nachfahren
//! - `all_connections`: alle Connections, die ein Shape der Closure berühren
//! - `top_level`: explizit selektierte Elemente (nur diese wechseln den Parent)
//! - `enclosed_connections`: Connections mit beiden Endpunkten in `all_shapes`
//! - `enclosed_elements`: alle besuchten Elemente inkl. eingeschlossener Connections

use crate::core::{Canvas, ElementId, ElementKind};
use indexmap::IndexSet;

/// Ergebnis der Closure-Berechnung (Besuchs-Reihenfolge bleibt erhalten).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Closure {
    pub all_shapes: IndexSet<ElementId>,
    pub all_connections: IndexSet<ElementId>,
    pub top_level: IndexSet<ElementId>,
    pub enclosed_elements: IndexSet<ElementId>,
    pub enclosed_connections: IndexSet<ElementId>,
}

impl Closure {
    /// Ergänzt ein einzelnes Element (siehe `add_all`).
    pub fn add(&mut self, canvas: &Canvas, element: &ElementId, is_top_level: bool) {
        self.add_all(canvas, std::slice::from_ref(element), is_top_level);
    }

    /// Ergänzt Elemente samt Nachfahren und Connections.
    ///
    /// Mit `is_top_level` werden die Elemente als explizit selektiert markiert.
    /// Nicht registrierte IDs werden übersprungen.
    pub fn add_all(&mut self, canvas: &Canvas, elements: &[ElementId], is_top_level: bool) {
        if is_top_level {
            for id in elements {
                if canvas.get(id).is_some() {
                    self.top_level.insert(id.clone());
                }
            }
        }

        for id in elements {
            self.visit(canvas, id);
        }
    }

    /// Tiefensuche: Shapes vor ihren Kindern, Connections ohne Abstieg.
    fn visit(&mut self, canvas: &Canvas, id: &ElementId) {
        let Some(element) = canvas.get(id) else {
            log::debug!("Closure: Element '{}' nicht registriert, übersprungen", id);
            return;
        };

        self.enclosed_elements.insert(id.clone());

        match &element.kind {
            ElementKind::Connection(_) => {
                self.enclosed_connections.insert(id.clone());
                self.all_connections.insert(id.clone());
            }
            ElementKind::Shape(data) => {
                self.all_shapes.insert(id.clone());
                for connection in data.incoming.iter().chain(data.outgoing.iter()) {
                    self.handle_connection(canvas, connection);
                }
                for child in &element.children {
                    self.visit(canvas, child);
                }
            }
            ElementKind::Root => {
                for child in &element.children {
                    self.visit(canvas, child);
                }
            }
        }
    }

    fn handle_connection(&mut self, canvas: &Canvas, connection: &ElementId) {
        let Ok(data) = canvas.connection(connection) else {
            return;
        };

        if self.top_level.contains(&data.source) && self.top_level.contains(&data.target) {
            self.top_level.insert(connection.clone());
        }
        if self.all_shapes.contains(&data.source) && self.all_shapes.contains(&data.target) {
            self.enclosed_connections.insert(connection.clone());
            self.enclosed_elements.insert(connection.clone());
        }
        self.all_connections.insert(connection.clone());
    }

    /// Alle Shapes als Vec (z.B. als neue Selektion).
    pub fn all_shapes_vec(&self) -> Vec<ElementId> {
        self.all_shapes.iter().cloned().collect()
    }

    /// Prüft ob die Closure leer ist.
    pub fn is_empty(&self) -> bool {
        self.enclosed_elements.is_empty()
    }
}

/// Berechnet die Closure einer Selektion.
pub fn get_closure(canvas: &Canvas, elements: &[ElementId]) -> Closure {
    let mut closure = Closure::default();
    closure.add_all(canvas, elements, true);
    closure
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Bounds, Element};

    /// Root mit Container P (Kinder A, B), externem Shape C
    /// und Connections A→B (intern), A→C (kreuzend).
    fn fixture() -> Canvas {
        let mut canvas = Canvas::headless();
        let root = canvas.get_root_element().expect("Root erwartet");
        let shape = |id: &str, x: f32| Element::shape(id, "task", Bounds::new(x, 0.0, 50.0, 50.0));

        canvas.add_shape(shape("P", 0.0), &root, None).expect("P");
        canvas.add_shape(shape("A", 10.0), "P", None).expect("A");
        canvas.add_shape(shape("B", 100.0), "P", None).expect("B");
        canvas.add_shape(shape("C", 400.0), &root, None).expect("C");
        canvas
            .add_connection(Element::connection("AB", "flow", "A", "B", Vec::new()), "P", None)
            .expect("AB");
        canvas
            .add_connection(Element::connection("AC", "flow", "A", "C", Vec::new()), &root, None)
            .expect("AC");
        canvas
    }

    fn ids(set: &IndexSet<ElementId>) -> Vec<&str> {
        set.iter().map(|id| id.as_str()).collect()
    }

    #[test]
    fn container_closure_encloses_internal_connection_only() {
        let canvas = fixture();
        let closure = get_closure(&canvas, &["P".into()]);

        assert_eq!(ids(&closure.all_shapes), vec!["P", "A", "B"]);
        assert_eq!(ids(&closure.top_level), vec!["P"]);
        assert!(closure.all_connections.contains("AC"));
        assert!(closure.enclosed_connections.contains("AB"));
        assert!(!closure.enclosed_connections.contains("AC"));
    }

    #[test]
    fn connection_between_top_level_shapes_is_top_level() {
        let canvas = fixture();
        let closure = get_closure(&canvas, &["A".into(), "C".into()]);

        assert!(closure.top_level.contains("AC"));
        assert!(closure.enclosed_connections.contains("AC"));
        assert!(!closure.top_level.contains("AB"));
        assert!(!closure.enclosed_connections.contains("AB"));
    }

    #[test]
    fn closure_of_closure_adds_nothing() {
        let canvas = fixture();
        let first = get_closure(&canvas, &["P".into()]);
        let second = get_closure(&canvas, &first.all_shapes_vec());

        assert_eq!(first.all_shapes, second.all_shapes);
        assert_eq!(first.all_connections, second.all_connections);
        assert_eq!(first.enclosed_connections, second.enclosed_connections);
        assert_eq!(first.enclosed_elements, second.enclosed_elements);
    }

    #[test]
    fn add_merges_without_top_level_flag() {
        let canvas = fixture();
        let mut closure = get_closure(&canvas, &["A".into()]);
        closure.add(&canvas, &"C".into(), false);

        assert!(closure.all_shapes.contains("C"));
        assert!(!closure.top_level.contains("C"));
        // AC wurde vor C besucht und ist erst über C eingeschlossen
        assert!(closure.enclosed_connections.contains("AC"));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let canvas = fixture();
        let closure = get_closure(&canvas, &["missing".into()]);
        assert!(closure.is_empty());
        assert!(closure.top_level.is_empty());
    }
}
