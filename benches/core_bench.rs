use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use diagram_modeler::command::Placement;
use diagram_modeler::copy_paste::create_tree;
use diagram_modeler::modeling::get_closure;
use diagram_modeler::rules::RuleProvider;
use diagram_modeler::{Bounds, Element, ElementId, Modeler};
use std::hint::black_box;

/// Raster aus Containern mit je `children` Kindern; Nachbarn sind über
/// Connections verkettet (innerhalb und zwischen Containern).
fn build_synthetic_diagram(containers: usize, children: usize) -> (Modeler, Vec<ElementId>) {
    let mut modeler = Modeler::default();
    let root = modeler.root().expect("Root erwartet");
    let mut top_level = Vec::with_capacity(containers);
    let mut previous: Option<ElementId> = None;

    for c in 0..containers {
        let x = (c % 50) as f32 * 1200.0;
        let y = (c / 50) as f32 * 900.0;
        let container_bounds = Bounds::new(x, y, 1000.0, 800.0);
        let container = modeler
            .create_shape_with(
                Element::shape(format!("P{c}"), "pool", container_bounds),
                Placement::Bounds(container_bounds),
                &root,
                None,
            )
            .expect("Container erwartet");

        for i in 0..children {
            let bounds = Bounds::new(x + 20.0 + (i % 8) as f32 * 120.0, y + 20.0 + (i / 8) as f32 * 100.0, 100.0, 80.0);
            let child = modeler
                .create_shape_with(
                    Element::shape(format!("P{c}_T{i}"), "task", bounds),
                    Placement::Bounds(bounds),
                    &container,
                    None,
                )
                .expect("Kind erwartet");

            if let Some(prev) = previous.take() {
                modeler
                    .create_connection(
                        &prev,
                        &child,
                        Element::connection(format!("F_{prev}_{child}"), "flow", prev.clone(), child.clone(), Vec::new()),
                        Some(&root),
                    )
                    .expect("Connection erwartet");
            }
            previous = Some(child);
        }
        top_level.push(container);
    }

    modeler.clear_history();
    (modeler, top_level)
}

fn bench_get_closure(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_closure");

    for &containers in &[10usize, 100usize] {
        let (modeler, selection) = build_synthetic_diagram(containers, 16);

        group.bench_with_input(
            BenchmarkId::new("containers_16_children", containers),
            &selection,
            |b, selection| {
                b.iter(|| {
                    let closure = get_closure(modeler.canvas(), black_box(selection));
                    black_box(closure.all_shapes.len())
                })
            },
        );
    }

    group.finish();
}

fn bench_create_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_tree");
    let rules = RuleProvider::new();

    for &containers in &[10usize, 100usize] {
        let (modeler, selection) = build_synthetic_diagram(containers, 16);

        group.bench_with_input(
            BenchmarkId::new("containers_16_children", containers),
            &selection,
            |b, selection| {
                b.iter(|| {
                    let tree = create_tree(modeler.canvas(), &rules, &[], black_box(selection));
                    black_box(tree.len())
                })
            },
        );
    }

    group.finish();
}

/// Flache Selektion aus `count` Shapes direkt unter der Root.
fn build_flat_selection(count: usize) -> (Modeler, Vec<ElementId>) {
    let mut modeler = Modeler::default();
    let root = modeler.root().expect("Root erwartet");
    let ids = (0..count)
        .map(|i| {
            let bounds = Bounds::new((i % 100) as f32 * 120.0, (i / 100) as f32 * 100.0, 100.0, 80.0);
            modeler
                .create_shape_with(Element::shape(format!("S{i}"), "task", bounds), Placement::Bounds(bounds), &root, None)
                .expect("Shape erwartet")
        })
        .collect();
    modeler.clear_history();
    (modeler, ids)
}

fn bench_copy_flat_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("copy_flat_selection");
    group.sample_size(20);

    for &count in &[1000usize, 4000usize, 16000usize] {
        let (mut modeler, ids) = build_flat_selection(count);

        group.bench_with_input(BenchmarkId::from_parameter(count), &ids, |b, ids| {
            b.iter(|| black_box(modeler.copy(black_box(ids)).len()))
        });
    }

    group.finish();
}

fn bench_move_and_undo(c: &mut Criterion) {
    let (mut modeler, selection) = build_synthetic_diagram(10, 16);
    let moved = &selection[..5];

    c.bench_function("elements_move_undo_10x16", |b| {
        b.iter(|| {
            modeler
                .move_elements(moved, glam::Vec2::new(10.0, 5.0), None, Default::default())
                .expect("Move erwartet");
            modeler.undo().expect("Undo erwartet");
            modeler.clear_history();
        })
    });
}

criterion_group!(
    benches,
    bench_get_closure,
    bench_create_tree,
    bench_copy_flat_selection,
    bench_move_and_undo
);
criterion_main!(benches);
