use diagram_modeler::command::Placement;
use diagram_modeler::rules::{self, Allowed, RuleContext, RuleProvider};
use diagram_modeler::{Bounds, Element, ElementId, Modeler, PasteOutcome, ReferenceDescriptor};
use glam::Vec2;
use indexmap::IndexMap;
use serde_json::json;

fn add_shape(
    modeler: &mut Modeler,
    id: &str,
    bounds: Bounds,
    host: Option<&str>,
) -> ElementId {
    let root = modeler.root().expect("Root erwartet");
    let host = host.map(ElementId::from);
    modeler
        .create_shape_with(
            Element::shape(id, "task", bounds),
            Placement::Bounds(bounds),
            &root,
            host.as_ref(),
        )
        .expect("Shape erwartet")
}

fn connect(modeler: &mut Modeler, id: &str, source: &str, target: &str) -> ElementId {
    modeler
        .create_connection(
            &source.into(),
            &target.into(),
            Element::connection(id, "flow", source, target, Vec::new()),
            None,
        )
        .expect("Connection erwartet")
}

fn pasted(outcome: PasteOutcome) -> IndexMap<ElementId, ElementId> {
    match outcome {
        PasteOutcome::Pasted(created) => created,
        other => panic!("Einfügen erwartet, erhalten: {other:?}"),
    }
}

fn position(modeler: &Modeler, id: &ElementId) -> Vec2 {
    modeler
        .canvas()
        .shape(id)
        .expect("Shape erwartet")
        .bounds
        .position()
}

#[test]
fn test_copy_host_and_attacher_paste_keeps_relative_geometry() {
    let mut modeler = Modeler::default();
    let host = add_shape(&mut modeler, "host", Bounds::new(100.0, 100.0, 100.0, 80.0), None);
    let attacher = add_shape(
        &mut modeler,
        "attacher",
        Bounds::new(182.0, 162.0, 36.0, 36.0),
        Some("host"),
    );

    let tree = modeler.copy(&[host.clone(), attacher.clone()]);
    assert_eq!(tree.len(), 2);

    let created = pasted(
        modeler
            .paste(None, Vec2::new(900.0, 350.0))
            .expect("Paste erwartet"),
    );
    let new_host = created.get(&host).expect("neuer Host");
    let new_attacher = created.get(&attacher).expect("neuer Attacher");

    assert_ne!(new_host, &host);
    assert_eq!(position(&modeler, new_host), Vec2::new(841.0, 301.0));
    assert_eq!(position(&modeler, new_attacher), Vec2::new(923.0, 363.0));
    assert_eq!(
        position(&modeler, new_attacher) - position(&modeler, new_host),
        position(&modeler, &attacher) - position(&modeler, &host)
    );
    assert_eq!(
        modeler.element(new_attacher).expect("Attacher").host(),
        Some(new_host)
    );
    assert_eq!(
        modeler.element(new_host).expect("Host").attachers(),
        &[new_attacher.clone()]
    );
}

#[test]
fn test_paste_is_one_undo_step() {
    let mut modeler = Modeler::default();
    add_shape(&mut modeler, "A", Bounds::new(0.0, 0.0, 100.0, 80.0), None);
    add_shape(&mut modeler, "B", Bounds::new(200.0, 0.0, 100.0, 80.0), None);
    connect(&mut modeler, "AB", "A", "B");
    let count = modeler.canvas().registry().len();

    modeler.copy(&["A".into(), "B".into()]);
    let created = pasted(
        modeler
            .paste(None, Vec2::new(500.0, 500.0))
            .expect("Paste erwartet"),
    );
    assert_eq!(created.len(), 3);
    assert_eq!(modeler.canvas().registry().len(), count + 3);

    let new_ab = created.get("AB").expect("neue Connection");
    let data = modeler.canvas().connection(new_ab).expect("Connection");
    assert_eq!(Some(&data.source), created.get("A"));
    assert_eq!(Some(&data.target), created.get("B"));

    assert!(modeler.undo().expect("Undo erwartet"));
    assert_eq!(modeler.canvas().registry().len(), count);
    assert!(modeler.canvas().dangling_references().is_empty());
}

#[test]
fn test_connection_with_rejected_endpoint_is_not_copied() {
    let provider = RuleProvider::new().with_rule(&[rules::ELEMENT_COPY], 1000, |context, _| {
        match context {
            RuleContext::ElementCopy { element, .. } if element.as_str() == "B" => Allowed::No,
            _ => Allowed::DontCare,
        }
    });
    let mut modeler = Modeler::default().with_rules(provider);
    add_shape(&mut modeler, "A", Bounds::new(0.0, 0.0, 100.0, 80.0), None);
    add_shape(&mut modeler, "B", Bounds::new(200.0, 0.0, 100.0, 80.0), None);
    connect(&mut modeler, "AB", "A", "B");

    let tree = modeler.copy(&["A".into(), "B".into()]);
    assert!(tree.find("B").is_none());
    assert!(tree.find("AB").is_none());

    let created = pasted(
        modeler
            .paste(None, Vec2::new(500.0, 500.0))
            .expect("Paste erwartet"),
    );
    assert_eq!(created.len(), 1);
    assert!(created.contains_key("A"));
}

#[test]
fn test_copy_rejected_by_rule_yields_empty_clipboard() {
    let provider =
        RuleProvider::new().with_rule(&[rules::ELEMENTS_COPY], 1000, |_, _| Allowed::No);
    let mut modeler = Modeler::default().with_rules(provider);
    add_shape(&mut modeler, "A", Bounds::new(0.0, 0.0, 100.0, 80.0), None);

    let tree = modeler.copy(&["A".into()]);

    assert!(tree.is_empty());
    assert_eq!(
        modeler.paste(None, Vec2::ZERO).expect("Paste erwartet"),
        PasteOutcome::Empty
    );
}

#[test]
fn test_rejected_paste_fires_event_and_changes_nothing() {
    let provider =
        RuleProvider::new().with_rule(&[rules::ELEMENTS_PASTE], 1000, |_, _| Allowed::No);
    let mut modeler = Modeler::default().with_rules(provider);
    add_shape(&mut modeler, "A", Bounds::new(0.0, 0.0, 100.0, 80.0), None);
    modeler.copy(&["A".into()]);
    let count = modeler.canvas().registry().len();
    let depth = modeler.command_stack().undo_depth();

    let rejected = std::rc::Rc::new(std::cell::Cell::new(false));
    let flag = std::rc::Rc::clone(&rejected);
    modeler
        .canvas_mut()
        .event_bus_mut()
        .on("elements.paste.rejected", 1000, move |_| {
            flag.set(true);
            diagram_modeler::core::Handled::Continue
        });

    let outcome = modeler
        .paste(None, Vec2::new(300.0, 300.0))
        .expect("Paste erwartet");

    assert_eq!(outcome, PasteOutcome::Rejected);
    assert!(rejected.get());
    assert_eq!(modeler.canvas().registry().len(), count);
    assert_eq!(modeler.command_stack().undo_depth(), depth);
}

#[test]
fn test_reference_properties_are_remapped_to_pasted_ids() {
    let mut modeler = Modeler::default();
    modeler.register_descriptor(ReferenceDescriptor::new(["default"]));
    let root = modeler.root().expect("Root erwartet");
    let gateway = Element::shape("G", "gateway", Bounds::new(0.0, 0.0, 50.0, 50.0))
        .with_property("default", "GB");
    modeler
        .create_shape_with(gateway, Placement::Bounds(Bounds::new(0.0, 0.0, 50.0, 50.0)), &root, None)
        .expect("Gateway erwartet");
    add_shape(&mut modeler, "B", Bounds::new(200.0, 0.0, 100.0, 80.0), None);
    add_shape(&mut modeler, "C", Bounds::new(200.0, 200.0, 100.0, 80.0), None);
    connect(&mut modeler, "GB", "G", "B");
    connect(&mut modeler, "GC", "G", "C");

    // C wird nicht kopiert: GC fällt weg, GB bleibt
    modeler.copy(&["G".into(), "B".into()]);
    let created = pasted(
        modeler
            .paste(None, Vec2::new(600.0, 600.0))
            .expect("Paste erwartet"),
    );

    let new_gateway = created.get("G").expect("neues Gateway");
    let new_flow = created.get("GB").expect("neue Connection");
    assert!(!created.contains_key("GC"));
    assert_eq!(
        modeler
            .element(new_gateway)
            .expect("Gateway")
            .properties
            .get("default"),
        Some(&json!(new_flow.as_str()))
    );
    // Original bleibt unverändert
    assert_eq!(
        modeler.element("G").expect("G").properties.get("default"),
        Some(&json!("GB"))
    );
}

#[test]
fn test_clipboard_tree_survives_json_roundtrip() {
    let mut modeler = Modeler::default();
    add_shape(&mut modeler, "A", Bounds::new(0.0, 0.0, 100.0, 80.0), None);
    add_shape(&mut modeler, "B", Bounds::new(200.0, 0.0, 100.0, 80.0), None);
    connect(&mut modeler, "AB", "A", "B");

    let tree = modeler.copy(&["A".into(), "B".into()]);
    let json = serde_json::to_string(&tree).expect("Serialisierung erwartet");
    let restored: diagram_modeler::CopyTree =
        serde_json::from_str(&json).expect("Deserialisierung erwartet");

    assert_eq!(restored, tree);
}
