use approx::assert_relative_eq;
use diagram_modeler::command::{LayoutHints, MoveHints, Placement};
use diagram_modeler::modeling::get_closure;
use diagram_modeler::{Bounds, Element, ElementId, Modeler, ModelingError, Waypoint};
use glam::Vec2;
use serde_json::{json, Map};

fn modeler_with_root() -> (Modeler, ElementId) {
    let mut modeler = Modeler::default();
    let root = modeler.root().expect("Root erwartet");
    (modeler, root)
}

fn add_shape(modeler: &mut Modeler, parent: &ElementId, id: &str, bounds: Bounds) -> ElementId {
    modeler
        .create_shape_with(
            Element::shape(id, "task", bounds),
            Placement::Bounds(bounds),
            parent,
            None,
        )
        .expect("Shape erwartet")
}

/// Position, Parent und Wegpunkte aller Elemente (für exakte Vergleiche).
fn geometry(modeler: &Modeler) -> Vec<(String, Option<Bounds>, Option<ElementId>, Vec<Waypoint>)> {
    modeler
        .canvas()
        .registry()
        .elements()
        .map(|element| {
            (
                element.id.to_string(),
                element.bounds(),
                element.parent.clone(),
                element.waypoints().to_vec(),
            )
        })
        .collect()
}

#[test]
fn test_nested_move_and_undo_restores_exact_geometry() {
    let (mut modeler, root) = modeler_with_root();
    let pool = add_shape(&mut modeler, &root, "pool", Bounds::new(0.0, 0.0, 600.0, 300.0));
    let lane = add_shape(&mut modeler, &root, "lane", Bounds::new(700.0, 0.0, 600.0, 300.0));
    add_shape(&mut modeler, &pool, "A", Bounds::new(20.0, 20.0, 100.0, 80.0));
    add_shape(&mut modeler, &pool, "B", Bounds::new(220.0, 20.0, 100.0, 80.0));
    add_shape(&mut modeler, &root, "C", Bounds::new(20.0, 400.0, 100.0, 80.0));
    modeler
        .create_connection(
            &"A".into(),
            &"B".into(),
            Element::connection("AB", "flow", "A", "B", Vec::new()),
            Some(&pool),
        )
        .expect("AB erwartet");
    modeler
        .create_connection(
            &"B".into(),
            &"C".into(),
            Element::connection("BC", "flow", "B", "C", Vec::new()),
            None,
        )
        .expect("BC erwartet");
    let before = geometry(&modeler);

    modeler
        .move_elements(
            &["A".into(), "B".into()],
            Vec2::new(713.5, 40.25),
            Some(&lane),
            MoveHints::default(),
        )
        .expect("Move erwartet");
    assert_ne!(geometry(&modeler), before);
    assert_eq!(
        modeler.element("A").expect("A").parent.as_ref(),
        Some(&lane)
    );

    assert!(modeler.undo().expect("Undo erwartet"));
    assert_eq!(geometry(&modeler), before);
    assert!(modeler.canvas().dangling_references().is_empty());
}

#[test]
fn test_closure_is_idempotent_on_public_api() {
    let (mut modeler, root) = modeler_with_root();
    let p = add_shape(&mut modeler, &root, "P", Bounds::new(0.0, 0.0, 400.0, 300.0));
    add_shape(&mut modeler, &p, "A", Bounds::new(10.0, 10.0, 50.0, 50.0));
    add_shape(&mut modeler, &root, "X", Bounds::new(500.0, 0.0, 50.0, 50.0));
    modeler
        .create_connection(&"A".into(), &"X".into(), Element::connection("AX", "flow", "A", "X", Vec::new()), None)
        .expect("AX erwartet");

    let first = get_closure(modeler.canvas(), &[p]);
    let second = get_closure(modeler.canvas(), &first.all_shapes_vec());

    assert_eq!(first.all_shapes, second.all_shapes);
    assert_eq!(first.all_connections, second.all_connections);
    assert!(first.all_connections.contains("AX"));
    assert!(!first.enclosed_connections.contains("AX"));
}

#[test]
fn test_reconnect_end_uses_anchor_and_undo_restores_endpoints() {
    let (mut modeler, root) = modeler_with_root();
    add_shape(&mut modeler, &root, "A", Bounds::new(0.0, 0.0, 100.0, 80.0));
    add_shape(&mut modeler, &root, "B", Bounds::new(300.0, 0.0, 100.0, 80.0));
    add_shape(&mut modeler, &root, "C", Bounds::new(300.0, 300.0, 100.0, 80.0));
    let ab = modeler
        .create_connection(
            &"A".into(),
            &"B".into(),
            Element::connection("AB", "flow", "A", "B", Vec::new()),
            None,
        )
        .expect("AB erwartet");
    let before = modeler.canvas().connection("AB").expect("AB").waypoints.clone();

    modeler
        .reconnect_end(&ab, &"C".into(), Vec2::new(350.0, 300.0))
        .expect("Reconnect erwartet");

    let data = modeler.canvas().connection("AB").expect("AB");
    assert_eq!(data.target.as_str(), "C");
    assert_eq!(data.waypoints.last().map(|wp| wp.point), Some(Vec2::new(350.0, 300.0)));
    assert!(modeler.element("C").expect("C").incoming().contains(&ab));
    assert!(modeler.element("B").expect("B").incoming().is_empty());

    assert!(modeler.undo().expect("Undo erwartet"));
    let data = modeler.canvas().connection("AB").expect("AB");
    assert_eq!(data.target.as_str(), "B");
    assert_eq!(data.waypoints, before);
    assert!(modeler.element("C").expect("C").incoming().is_empty());
}

#[test]
fn test_create_connection_without_waypoints_lays_out_mid_to_mid() {
    let (mut modeler, root) = modeler_with_root();
    add_shape(&mut modeler, &root, "A", Bounds::new(0.0, 0.0, 100.0, 80.0));
    add_shape(&mut modeler, &root, "B", Bounds::new(300.0, 0.0, 100.0, 80.0));

    modeler
        .create_connection(&"A".into(), &"B".into(), Element::connection("AB", "flow", "A", "B", Vec::new()), None)
        .expect("AB erwartet");

    let points: Vec<Vec2> = modeler
        .canvas()
        .connection("AB")
        .expect("AB")
        .waypoints
        .iter()
        .map(|wp| wp.point)
        .collect();
    assert_eq!(points, vec![Vec2::new(50.0, 40.0), Vec2::new(350.0, 40.0)]);
}

#[test]
fn test_connection_to_missing_shape_fails_without_mutation() {
    let (mut modeler, root) = modeler_with_root();
    add_shape(&mut modeler, &root, "A", Bounds::new(0.0, 0.0, 100.0, 80.0));
    let count = modeler.canvas().registry().len();

    let err = modeler
        .create_connection(
            &"A".into(),
            &"missing".into(),
            Element::connection("AX", "flow", "A", "missing", Vec::new()),
            None,
        )
        .expect_err("Fehler erwartet");

    assert!(matches!(
        err,
        ModelingError::MissingEndpoint(_) | ModelingError::ElementNotFound(_)
    ));
    assert_eq!(modeler.canvas().registry().len(), count);
    assert!(modeler.element("A").expect("A").outgoing().is_empty());
}

#[test]
fn test_duplicate_id_is_rejected() {
    let (mut modeler, root) = modeler_with_root();
    add_shape(&mut modeler, &root, "A", Bounds::new(0.0, 0.0, 100.0, 80.0));

    let err = modeler
        .create_shape(Element::shape("A", "task", Bounds::new(0.0, 0.0, 10.0, 10.0)), Vec2::ZERO, &root)
        .expect_err("Fehler erwartet");

    assert_eq!(err, ModelingError::DuplicateId("A".into()));
    assert_eq!(modeler.command_stack().undo_depth(), 1);
}

#[test]
fn test_update_properties_removes_null_and_undo_restores() {
    let (mut modeler, root) = modeler_with_root();
    let shape = Element::shape("A", "task", Bounds::new(0.0, 0.0, 100.0, 80.0))
        .with_property("name", "Prüfen")
        .with_property("priority", 3);
    modeler
        .create_shape_with(shape, Placement::Center(Vec2::new(50.0, 40.0)), &root, None)
        .expect("Shape erwartet");

    let mut patch = Map::new();
    patch.insert("name".into(), json!("Freigeben"));
    patch.insert("priority".into(), serde_json::Value::Null);
    modeler
        .update_properties(&"A".into(), patch)
        .expect("Update erwartet");

    let properties = &modeler.element("A").expect("A").properties;
    assert_eq!(properties.get("name"), Some(&json!("Freigeben")));
    assert!(!properties.contains_key("priority"));

    assert!(modeler.undo().expect("Undo erwartet"));
    let properties = &modeler.element("A").expect("A").properties;
    assert_eq!(properties.get("name"), Some(&json!("Prüfen")));
    assert_eq!(properties.get("priority"), Some(&json!(3)));
}

#[test]
fn test_layout_connection_with_start_hint_keeps_inner_waypoints() {
    let (mut modeler, root) = modeler_with_root();
    add_shape(&mut modeler, &root, "A", Bounds::new(0.0, 0.0, 100.0, 80.0));
    add_shape(&mut modeler, &root, "B", Bounds::new(300.0, 300.0, 100.0, 80.0));
    let waypoints = vec![
        Waypoint::new(50.0, 80.0),
        Waypoint::new(50.0, 340.0),
        Waypoint::new(300.0, 340.0),
    ];
    modeler
        .create_connection(&"A".into(), &"B".into(), Element::connection("AB", "flow", "A", "B", waypoints), None)
        .expect("AB erwartet");

    let hints = LayoutHints {
        connection_start: Some(Vec2::new(100.0, 40.0)),
        ..LayoutHints::default()
    };
    modeler.layout_connection(&"AB".into(), hints).expect("Layout erwartet");

    let data = modeler.canvas().connection("AB").expect("AB");
    assert_eq!(data.waypoints[0].point, Vec2::new(100.0, 40.0));
    assert_relative_eq!(data.waypoints[1].point.y, 340.0);
    assert_eq!(data.waypoints.len(), 3);
}

#[test]
fn test_sessions_are_independent() {
    let (mut first, first_root) = modeler_with_root();
    let (second, _) = modeler_with_root();

    add_shape(&mut first, &first_root, "A", Bounds::new(0.0, 0.0, 100.0, 80.0));

    assert!(first.canvas().get("A").is_some());
    assert!(second.canvas().get("A").is_none());
    assert!(!second.can_undo());
}

#[test]
fn test_clear_history_drops_undo_and_redo() {
    let (mut modeler, root) = modeler_with_root();
    add_shape(&mut modeler, &root, "A", Bounds::new(0.0, 0.0, 100.0, 80.0));
    add_shape(&mut modeler, &root, "B", Bounds::new(200.0, 0.0, 100.0, 80.0));
    assert!(modeler.undo().expect("Undo erwartet"));

    modeler.clear_history();

    assert!(!modeler.can_undo());
    assert!(!modeler.can_redo());
    assert!(modeler.canvas().get("A").is_some());
}
