//! Core-Domänentypen: Elemente, Geometrie, Registry, Event-Bus und Canvas.

pub mod canvas;
/// Diagramm-Elemente
///
/// Dieses Modul definiert die Haupt-Datenstrukturen:
/// - Element: Root, Shape (inkl. Label) oder Connection
/// - ElementId: Eindeutige ID innerhalb einer Session
/// - Waypoint: Wegpunkt einer Connection
pub mod element;
pub mod element_factory;
pub mod event_bus;
pub mod geometry;
pub mod graphics;
pub mod registry;

pub use canvas::{Canvas, DiagramSnapshot};
pub use element::{ConnectionData, Element, ElementId, ElementKind, ShapeData, Waypoint};
pub use element_factory::ElementFactory;
pub use event_bus::{Event, EventBus, EventPayload, Handled, ListenerId, DEFAULT_PRIORITY};
pub use geometry::{
    bounding_box, get_new_attach_point, get_new_attach_shape_delta, round_point, Bounds,
};
pub use graphics::{Graphics, GraphicsFactory, HeadlessGraphics};
pub use registry::{ElementRegistry, RegistryEntry};
