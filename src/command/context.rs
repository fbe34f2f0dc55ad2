//! Typisierte Command-Kontexte.
//!
//! Jeder Command besitzt einen eigenen Kontext-Typ. Handler ergänzen den
//! Kontext während der Ausführung um die Werte, die `revert` braucht
//! (alte Bounds, alter Parent, entfernte Elemente ...). Der gespeicherte
//! Kontext einer Aktion ist damit die vollständige Undo-Information.

use crate::copy_paste::{CopyTree, Descriptor};
use crate::core::{Bounds, Element, ElementId, Waypoint};
use crate::error::ModelingError;
use crate::modeling::Closure;
use glam::Vec2;
use indexmap::IndexMap;
use serde_json::{Map, Value};

// ── Hints ──────────────────────────────────────────────────────────

/// Steuerung von Move-Commands.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveHints {
    /// Kinder rekursiv mitbewegen (nur `shape.move`)
    pub recurse: bool,
    /// Verbindungen des Shapes neu layouten (nur `shape.move`)
    pub layout: bool,
    /// Shape, dessen Parent-Wechsel über `keep_parent` entscheidet
    pub primary_shape: Option<ElementId>,
    /// `Some(true)` = an das Ziel anheften, `Some(false)` = niemals anheften
    pub attach: Option<bool>,
}

impl Default for MoveHints {
    fn default() -> Self {
        Self {
            recurse: true,
            layout: true,
            primary_shape: None,
            attach: None,
        }
    }
}

/// Steuerung von `shape.resize`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeHints {
    pub layout: bool,
    /// Attacher proportional mitbewegen
    pub attach_support: bool,
}

impl Default for ResizeHints {
    fn default() -> Self {
        Self {
            layout: true,
            attach_support: true,
        }
    }
}

/// Vorgaben für das Layout einer Connection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutHints {
    pub connection_start: Option<Vec2>,
    pub connection_end: Option<Vec2>,
}

/// Steuerung von `shape.replace`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceHints {
    /// Kinder in das neue Shape übernehmen
    pub move_children: bool,
    /// Attacher, die am neuen Shape hängen bleiben
    pub retain_attachment_ids: Vec<ElementId>,
}

impl Default for ReplaceHints {
    fn default() -> Self {
        Self {
            move_children: true,
            retain_attachment_ids: Vec::new(),
        }
    }
}

/// Platzierung eines neuen Shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Mittelpunkt; die Ecke wird aus der Template-Größe berechnet
    Center(Vec2),
    /// Explizite Bounds
    Bounds(Bounds),
}

/// Daten für das Ersatz-Shape bei `shape.replace`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReplaceData {
    pub element_type: String,
    /// Neue Breite (Standard: Breite des alten Shapes)
    pub width: Option<f32>,
    /// Neue Höhe (Standard: Höhe des alten Shapes)
    pub height: Option<f32>,
    /// Neuer Mittelpunkt (Standard: Mittelpunkt des alten Shapes)
    pub center: Option<Vec2>,
    /// Zusätzliche Properties; überschreiben die des alten Shapes
    pub properties: Map<String, Value>,
}

impl ReplaceData {
    pub fn new(element_type: impl Into<String>) -> Self {
        Self {
            element_type: element_type.into(),
            ..Self::default()
        }
    }
}

// ── Kontexte ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeCreateContext {
    /// Template; nach `execute` das platzierte Element
    pub shape: Element,
    pub position: Placement,
    pub parent: ElementId,
    pub parent_index: Option<usize>,
    /// Host, an den das neue Shape angeheftet wird
    pub host: Option<ElementId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelCreateContext {
    pub label: Element,
    pub label_target: ElementId,
    pub position: Placement,
    pub parent: ElementId,
    pub parent_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDeleteContext {
    pub shape: ElementId,
    pub old_parent: Option<ElementId>,
    pub old_parent_index: Option<usize>,
    /// Entferntes Element für die Wiederherstellung
    pub removed: Option<Element>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeMoveContext {
    pub shape: ElementId,
    pub delta: Vec2,
    pub new_parent: Option<ElementId>,
    pub new_parent_index: Option<usize>,
    pub hints: MoveHints,
    pub old_parent: Option<ElementId>,
    pub old_parent_index: Option<usize>,
    pub old_bounds: Option<Bounds>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeResizeContext {
    pub shape: ElementId,
    pub new_bounds: Bounds,
    /// Mindestgröße (Standard: Optionen)
    pub min_size: Option<Vec2>,
    pub hints: ResizeHints,
    pub old_bounds: Option<Bounds>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeReplaceContext {
    pub old_shape: ElementId,
    pub new_data: ReplaceData,
    pub hints: ReplaceHints,
    pub new_shape: Option<ElementId>,
    /// Bounds des alten Shapes zum Zeitpunkt des Ersetzens
    pub old_bounds: Option<Bounds>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionCreateContext {
    /// Template; nach `execute` die registrierte Connection
    pub connection: Element,
    pub source: ElementId,
    pub target: ElementId,
    pub parent: ElementId,
    pub parent_index: Option<usize>,
    pub hints: LayoutHints,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionDeleteContext {
    pub connection: ElementId,
    pub old_parent: Option<ElementId>,
    pub old_parent_index: Option<usize>,
    pub removed: Option<Element>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionMoveContext {
    pub connection: ElementId,
    pub delta: Vec2,
    pub new_parent: Option<ElementId>,
    pub new_parent_index: Option<usize>,
    pub old_parent: Option<ElementId>,
    pub old_parent_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionLayoutContext {
    pub connection: ElementId,
    pub hints: LayoutHints,
    pub old_waypoints: Option<Vec<Waypoint>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionReconnectContext {
    pub connection: ElementId,
    pub new_source: ElementId,
    pub new_target: ElementId,
    /// Explizite Wegpunkte; sonst Layout mit `hints`
    pub waypoints: Option<Vec<Waypoint>>,
    pub hints: LayoutHints,
    pub old_source: Option<ElementId>,
    pub old_target: Option<ElementId>,
    pub old_waypoints: Option<Vec<Waypoint>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentUpdateContext {
    pub shape: ElementId,
    pub new_host: Option<ElementId>,
    pub old_host: Option<ElementId>,
    /// Index in der Attacher-Liste des alten Hosts
    pub attacher_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertiesUpdateContext {
    pub element: ElementId,
    /// Zu setzende Properties; `null` entfernt den Schlüssel
    pub properties: Map<String, Value>,
    pub old_properties: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementsMoveContext {
    pub shapes: Vec<ElementId>,
    pub delta: Vec2,
    pub new_parent: Option<ElementId>,
    pub new_host: Option<ElementId>,
    pub hints: MoveHints,
    /// In `pre_execute` berechnet, von Behaviors erweitert
    pub closure: Option<Closure>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementsCreateContext {
    pub descriptors: Vec<Descriptor>,
    pub parent: ElementId,
    /// Zielpunkt für den BBox-Mittelpunkt (`None` = absolute Geometrie)
    pub position: Option<Vec2>,
    /// Zuordnung Deskriptor-ID → neue Element-ID
    pub created: IndexMap<ElementId, ElementId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementsDeleteContext {
    pub elements: Vec<ElementId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementsPasteContext {
    pub tree: CopyTree,
    pub target: ElementId,
    pub position: Vec2,
    pub created: IndexMap<ElementId, ElementId>,
}

/// Kontext eines beliebigen Commands.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandContext {
    ShapeCreate(ShapeCreateContext),
    LabelCreate(LabelCreateContext),
    ShapeDelete(ShapeDeleteContext),
    ShapeMove(ShapeMoveContext),
    ShapeResize(ShapeResizeContext),
    ShapeReplace(ShapeReplaceContext),
    ConnectionCreate(ConnectionCreateContext),
    ConnectionDelete(ConnectionDeleteContext),
    ConnectionMove(ConnectionMoveContext),
    ConnectionLayout(ConnectionLayoutContext),
    ConnectionReconnect(ConnectionReconnectContext),
    AttachmentUpdate(AttachmentUpdateContext),
    PropertiesUpdate(PropertiesUpdateContext),
    ElementsMove(ElementsMoveContext),
    ElementsCreate(ElementsCreateContext),
    ElementsDelete(ElementsDeleteContext),
    ElementsPaste(ElementsPasteContext),
}

/// Erzeugt `as_*`/`as_*_mut`-Zugriffe, die bei falscher Variante
/// `ContextMismatch` liefern, sowie `From`-Konvertierungen.
macro_rules! context_variants {
    ($($variant:ident($ty:ty) => $as_ref:ident, $as_mut:ident;)*) => {
        impl CommandContext {
            $(
                pub fn $as_ref(&self, command: &str) -> Result<&$ty, ModelingError> {
                    match self {
                        Self::$variant(ctx) => Ok(ctx),
                        _ => Err(ModelingError::mismatch(command)),
                    }
                }

                pub fn $as_mut(&mut self, command: &str) -> Result<&mut $ty, ModelingError> {
                    match self {
                        Self::$variant(ctx) => Ok(ctx),
                        _ => Err(ModelingError::mismatch(command)),
                    }
                }
            )*
        }

        $(
            impl From<$ty> for CommandContext {
                fn from(ctx: $ty) -> Self {
                    Self::$variant(ctx)
                }
            }
        )*
    };
}

context_variants! {
    ShapeCreate(ShapeCreateContext) => as_shape_create, as_shape_create_mut;
    LabelCreate(LabelCreateContext) => as_label_create, as_label_create_mut;
    ShapeDelete(ShapeDeleteContext) => as_shape_delete, as_shape_delete_mut;
    ShapeMove(ShapeMoveContext) => as_shape_move, as_shape_move_mut;
    ShapeResize(ShapeResizeContext) => as_shape_resize, as_shape_resize_mut;
    ShapeReplace(ShapeReplaceContext) => as_shape_replace, as_shape_replace_mut;
    ConnectionCreate(ConnectionCreateContext) => as_connection_create, as_connection_create_mut;
    ConnectionDelete(ConnectionDeleteContext) => as_connection_delete, as_connection_delete_mut;
    ConnectionMove(ConnectionMoveContext) => as_connection_move, as_connection_move_mut;
    ConnectionLayout(ConnectionLayoutContext) => as_connection_layout, as_connection_layout_mut;
    ConnectionReconnect(ConnectionReconnectContext) => as_connection_reconnect, as_connection_reconnect_mut;
    AttachmentUpdate(AttachmentUpdateContext) => as_attachment_update, as_attachment_update_mut;
    PropertiesUpdate(PropertiesUpdateContext) => as_properties_update, as_properties_update_mut;
    ElementsMove(ElementsMoveContext) => as_elements_move, as_elements_move_mut;
    ElementsCreate(ElementsCreateContext) => as_elements_create, as_elements_create_mut;
    ElementsDelete(ElementsDeleteContext) => as_elements_delete, as_elements_delete_mut;
    ElementsPaste(ElementsPasteContext) => as_elements_paste, as_elements_paste_mut;
}

// ── Konstruktoren ──────────────────────────────────────────────────

impl ShapeDeleteContext {
    pub fn new(shape: impl Into<ElementId>) -> Self {
        Self {
            shape: shape.into(),
            old_parent: None,
            old_parent_index: None,
            removed: None,
        }
    }
}

impl ShapeMoveContext {
    pub fn new(shape: impl Into<ElementId>, delta: Vec2) -> Self {
        Self {
            shape: shape.into(),
            delta,
            new_parent: None,
            new_parent_index: None,
            hints: MoveHints::default(),
            old_parent: None,
            old_parent_index: None,
            old_bounds: None,
        }
    }
}

impl ShapeResizeContext {
    pub fn new(shape: impl Into<ElementId>, new_bounds: Bounds) -> Self {
        Self {
            shape: shape.into(),
            new_bounds,
            min_size: None,
            hints: ResizeHints::default(),
            old_bounds: None,
        }
    }
}

impl ConnectionDeleteContext {
    pub fn new(connection: impl Into<ElementId>) -> Self {
        Self {
            connection: connection.into(),
            old_parent: None,
            old_parent_index: None,
            removed: None,
        }
    }
}

impl ConnectionMoveContext {
    pub fn new(connection: impl Into<ElementId>, delta: Vec2) -> Self {
        Self {
            connection: connection.into(),
            delta,
            new_parent: None,
            new_parent_index: None,
            old_parent: None,
            old_parent_index: None,
        }
    }
}

impl ConnectionLayoutContext {
    pub fn new(connection: impl Into<ElementId>, hints: LayoutHints) -> Self {
        Self {
            connection: connection.into(),
            hints,
            old_waypoints: None,
        }
    }
}

impl ConnectionReconnectContext {
    pub fn new(
        connection: impl Into<ElementId>,
        new_source: impl Into<ElementId>,
        new_target: impl Into<ElementId>,
        hints: LayoutHints,
    ) -> Self {
        Self {
            connection: connection.into(),
            new_source: new_source.into(),
            new_target: new_target.into(),
            waypoints: None,
            hints,
            old_source: None,
            old_target: None,
            old_waypoints: None,
        }
    }
}

impl AttachmentUpdateContext {
    pub fn new(shape: impl Into<ElementId>, new_host: Option<ElementId>) -> Self {
        Self {
            shape: shape.into(),
            new_host,
            old_host: None,
            attacher_index: None,
        }
    }
}

impl PropertiesUpdateContext {
    pub fn new(element: impl Into<ElementId>, properties: Map<String, Value>) -> Self {
        Self {
            element: element.into(),
            properties,
            old_properties: None,
        }
    }
}
