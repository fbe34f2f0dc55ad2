//! Connection-Layout und Anker-Berechnung für verschobene/skalierte Shapes.

use crate::command::LayoutHints;
use crate::core::{get_new_attach_point, Bounds, Canvas, ConnectionData, Element, Waypoint};
use glam::Vec2;

/// Berechnet die Wegpunkte einer Connection.
pub trait Layouter {
    fn layout_connection(&self, canvas: &Canvas, connection: &Element, hints: &LayoutHints) -> Vec<Waypoint>;
}

/// Minimaler Layouter.
///
/// Ersetzt nur die per Hint vorgegebenen Start-/Endpunkte und behält alle
/// übrigen Wegpunkte. Ohne brauchbare Wegpunkte wird Mitte-zu-Mitte gelegt.
#[derive(Debug, Default, Clone, Copy)]
pub struct BaseLayouter;

impl Layouter for BaseLayouter {
    fn layout_connection(&self, canvas: &Canvas, connection: &Element, hints: &LayoutHints) -> Vec<Waypoint> {
        let Some(data) = connection.connection_data() else {
            return Vec::new();
        };

        if data.waypoints.len() < 2 {
            let mid = |id: &str| {
                canvas
                    .shape(id)
                    .map(|shape| shape.bounds.center())
                    .unwrap_or(Vec2::ZERO)
            };
            let start = hints.connection_start.unwrap_or_else(|| mid(data.source.as_str()));
            let end = hints.connection_end.unwrap_or_else(|| mid(data.target.as_str()));
            return vec![anchored(start), anchored(end)];
        }

        let mut waypoints = data.waypoints.clone();
        if let Some(start) = hints.connection_start {
            waypoints[0] = anchored(start);
        }
        if let Some(end) = hints.connection_end {
            let last = waypoints.len() - 1;
            waypoints[last] = anchored(end);
        }
        waypoints
    }
}

/// Endpunkt auf einem Anker; `original` bleibt für spätere Anker-Rechnungen erhalten.
fn anchored(point: Vec2) -> Waypoint {
    Waypoint::from(point).with_original(point)
}

/// Anker-Punkt des ersten Wegpunkts (oder Mitte von `fallback`).
fn start_anchor(connection: &ConnectionData, fallback: &Bounds) -> Vec2 {
    connection
        .waypoints
        .first()
        .map(Waypoint::anchor)
        .unwrap_or_else(|| fallback.center())
}

/// Anker-Punkt des letzten Wegpunkts (oder Mitte von `fallback`).
fn end_anchor(connection: &ConnectionData, fallback: &Bounds) -> Vec2 {
    connection
        .waypoints
        .last()
        .map(Waypoint::anchor)
        .unwrap_or_else(|| fallback.center())
}

/// Neuer Start-Anker, nachdem die Source um `delta` nach `source_bounds` verschoben wurde.
pub fn moved_source_anchor(connection: &ConnectionData, source_bounds: &Bounds, delta: Vec2) -> Vec2 {
    let old_bounds = source_bounds.translate(-delta);
    get_new_attach_point(start_anchor(connection, &old_bounds), &old_bounds, source_bounds)
}

/// Neuer End-Anker, nachdem das Target um `delta` nach `target_bounds` verschoben wurde.
pub fn moved_target_anchor(connection: &ConnectionData, target_bounds: &Bounds, delta: Vec2) -> Vec2 {
    let old_bounds = target_bounds.translate(-delta);
    get_new_attach_point(end_anchor(connection, &old_bounds), &old_bounds, target_bounds)
}

/// Neuer Start-Anker nach Resize der Source.
pub fn resized_source_anchor(connection: &ConnectionData, new_bounds: &Bounds, old_bounds: &Bounds) -> Vec2 {
    get_new_attach_point(start_anchor(connection, old_bounds), old_bounds, new_bounds)
}

/// Neuer End-Anker nach Resize des Targets.
pub fn resized_target_anchor(connection: &ConnectionData, new_bounds: &Bounds, old_bounds: &Bounds) -> Vec2 {
    get_new_attach_point(end_anchor(connection, old_bounds), old_bounds, new_bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ElementId;

    fn connection(waypoints: Vec<Waypoint>) -> ConnectionData {
        ConnectionData {
            source: ElementId::from("a"),
            target: ElementId::from("b"),
            waypoints,
        }
    }

    #[test]
    fn moved_source_anchor_prefers_original_point() {
        let conn = connection(vec![
            Waypoint::new(180.0, 140.0).with_original(Vec2::new(140.0, 140.0)),
            Waypoint::new(300.0, 140.0),
        ]);
        let moved = Bounds::new(150.0, 100.0, 80.0, 80.0);

        let anchor = moved_source_anchor(&conn, &moved, Vec2::new(50.0, 0.0));
        assert_eq!(anchor, Vec2::new(190.0, 140.0));
    }

    #[test]
    fn resized_target_anchor_scales_offset() {
        let conn = connection(vec![Waypoint::new(0.0, 0.0), Waypoint::new(100.0, 150.0)]);
        let old = Bounds::new(100.0, 100.0, 100.0, 100.0);
        let new = Bounds::new(100.0, 100.0, 200.0, 100.0);

        // Mitte-links bleibt Mitte-links
        let anchor = resized_target_anchor(&conn, &new, &old);
        assert_eq!(anchor, Vec2::new(100.0, 150.0));
    }

    #[test]
    fn base_layouter_keeps_inner_waypoints() {
        let mut canvas = Canvas::headless();
        let root = canvas.get_root_element().expect("Root erwartet");
        canvas
            .add_shape(Element::shape("a", "task", Bounds::new(0.0, 0.0, 10.0, 10.0)), &root, None)
            .expect("a");
        canvas
            .add_shape(Element::shape("b", "task", Bounds::new(100.0, 0.0, 10.0, 10.0)), &root, None)
            .expect("b");

        let element = Element::connection(
            "c",
            "flow",
            "a",
            "b",
            vec![
                Waypoint::new(10.0, 5.0),
                Waypoint::new(50.0, 50.0),
                Waypoint::new(100.0, 5.0),
            ],
        );
        let hints = LayoutHints {
            connection_start: Some(Vec2::new(5.0, 10.0)),
            connection_end: None,
        };
        let waypoints = BaseLayouter.layout_connection(&canvas, &element, &hints);
        assert_eq!(waypoints.len(), 3);
        assert_eq!(waypoints[0].point, Vec2::new(5.0, 10.0));
        assert_eq!(waypoints[1].point, Vec2::new(50.0, 50.0));
        assert_eq!(waypoints[2].point, Vec2::new(100.0, 5.0));

        assert_eq!(waypoints[0].original, Some(Vec2::new(5.0, 10.0)));
        assert_eq!(waypoints[1].original, None);

        let bare = Element::connection("d", "flow", "a", "b", Vec::new());
        let waypoints = BaseLayouter.layout_connection(&canvas, &bare, &LayoutHints::default());
        assert_eq!(
            waypoints.iter().map(|wp| wp.point).collect::<Vec<_>>(),
            vec![Vec2::new(5.0, 5.0), Vec2::new(105.0, 5.0)]
        );
    }

    #[test]
    fn reanchored_endpoint_keeps_original_for_repeated_moves() {
        let mut canvas = Canvas::headless();
        let root = canvas.get_root_element().expect("Root erwartet");
        canvas
            .add_shape(Element::shape("a", "task", Bounds::new(100.0, 100.0, 80.0, 80.0)), &root, None)
            .expect("a");
        canvas
            .add_shape(Element::shape("b", "task", Bounds::new(400.0, 100.0, 80.0, 80.0)), &root, None)
            .expect("b");

        // Gekappter Start: Punkt am Rand, Original in der Mitte
        let mut element = Element::connection(
            "c",
            "flow",
            "a",
            "b",
            vec![
                Waypoint::new(180.0, 140.0).with_original(Vec2::new(140.0, 140.0)),
                Waypoint::new(400.0, 140.0),
            ],
        );

        // Zweimal um 50 nach rechts verschieben
        for step in 1..=2 {
            let delta = Vec2::new(50.0, 0.0);
            let moved = Bounds::new(100.0 + 50.0 * step as f32, 100.0, 80.0, 80.0);
            let data = element.connection_data().expect("Connection-Daten erwartet");
            let hints = LayoutHints {
                connection_start: Some(moved_source_anchor(data, &moved, delta)),
                connection_end: None,
            };
            let waypoints = BaseLayouter.layout_connection(&canvas, &element, &hints);
            if let Some(data) = element.connection_data_mut() {
                data.waypoints = waypoints;
                // Kappen auf den rechten Rand verschiebt nur den Punkt
                data.waypoints[0].point.x += 40.0;
            }
        }

        let first = element.connection_data().expect("Connection-Daten erwartet").waypoints[0];
        assert_eq!(first.point, Vec2::new(280.0, 140.0));
        assert_eq!(first.anchor(), Vec2::new(240.0, 140.0));
    }
}
