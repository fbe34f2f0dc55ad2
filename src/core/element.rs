//! Diagramm-Elemente: Roots, Shapes (inkl. Labels) und Connections.
//!
//! Elemente referenzieren einander ausschließlich über `ElementId`; die
//! Registry im `Canvas` ist die einzige Besitzerin der Element-Daten.

use super::geometry::Bounds;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Eindeutige Element-ID innerhalb einer Diagramm-Session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Erstellt eine neue ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// ID als String-Slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for ElementId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ElementId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&ElementId> for ElementId {
    fn from(id: &ElementId) -> Self {
        id.clone()
    }
}

/// Wegpunkt einer Connection.
///
/// `original` ist der ungeschnittene Andock-Punkt; Anker-Berechnungen
/// bevorzugen ihn gegenüber dem sichtbaren Punkt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub point: Vec2,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<Vec2>,
}

impl Waypoint {
    /// Wegpunkt ohne Original-Punkt.
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            point: Vec2::new(x, y),
            original: None,
        }
    }

    /// Setzt den Original-Punkt.
    pub fn with_original(mut self, original: Vec2) -> Self {
        self.original = Some(original);
        self
    }

    /// Punkt, der für Anker-Berechnungen maßgeblich ist.
    pub fn anchor(&self) -> Vec2 {
        self.original.unwrap_or(self.point)
    }

    /// Verschiebt Punkt und Original um `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        self.point += delta;
        if let Some(original) = self.original.as_mut() {
            *original += delta;
        }
    }
}

impl From<Vec2> for Waypoint {
    fn from(point: Vec2) -> Self {
        Self {
            point,
            original: None,
        }
    }
}

/// Daten eines Shapes (auch Labels sind Shapes mit `label_target`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShapeData {
    pub bounds: Bounds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<ElementId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachers: Vec<ElementId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_target: Option<ElementId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub incoming: Vec<ElementId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outgoing: Vec<ElementId>,
}

/// Daten einer Connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionData {
    pub source: ElementId,
    pub target: ElementId,
    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
}

/// Art eines Elements mit den art-spezifischen Feldern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ElementKind {
    /// Wurzel einer Zeichenebene
    Root,
    /// Shape oder Label
    Shape(ShapeData),
    /// Gerichtete Kante zwischen zwei Shapes
    Connection(ConnectionData),
}

/// Ein Diagramm-Element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    /// Fachlicher Typ (z.B. "task", "boundary-event")
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ElementId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<ElementId>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    fn with_kind(id: impl Into<ElementId>, element_type: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            element_type: element_type.into(),
            parent: None,
            children: Vec::new(),
            label: None,
            hidden: false,
            properties: Map::new(),
            kind,
        }
    }

    /// Neues Root-Element.
    pub fn root(id: impl Into<ElementId>) -> Self {
        Self::with_kind(id, "root", ElementKind::Root)
    }

    /// Neues Shape mit gegebenen Bounds.
    pub fn shape(id: impl Into<ElementId>, element_type: impl Into<String>, bounds: Bounds) -> Self {
        Self::with_kind(
            id,
            element_type,
            ElementKind::Shape(ShapeData {
                bounds,
                ..ShapeData::default()
            }),
        )
    }

    /// Neues Label für `target`.
    pub fn label(
        id: impl Into<ElementId>,
        element_type: impl Into<String>,
        target: impl Into<ElementId>,
        bounds: Bounds,
    ) -> Self {
        Self::with_kind(
            id,
            element_type,
            ElementKind::Shape(ShapeData {
                bounds,
                label_target: Some(target.into()),
                ..ShapeData::default()
            }),
        )
    }

    /// Neue Connection von `source` nach `target`.
    pub fn connection(
        id: impl Into<ElementId>,
        element_type: impl Into<String>,
        source: impl Into<ElementId>,
        target: impl Into<ElementId>,
        waypoints: Vec<Waypoint>,
    ) -> Self {
        Self::with_kind(
            id,
            element_type,
            ElementKind::Connection(ConnectionData {
                source: source.into(),
                target: target.into(),
                waypoints,
            }),
        )
    }

    /// Setzt eine fachliche Property (Builder-Stil).
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, ElementKind::Root)
    }

    pub fn is_shape(&self) -> bool {
        matches!(self.kind, ElementKind::Shape(_))
    }

    pub fn is_connection(&self) -> bool {
        matches!(self.kind, ElementKind::Connection(_))
    }

    /// Shape mit gesetztem `label_target`.
    pub fn is_label(&self) -> bool {
        self.label_target().is_some()
    }

    /// Name der Element-Art für Events ("root", "shape", "connection").
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ElementKind::Root => "root",
            ElementKind::Shape(_) => "shape",
            ElementKind::Connection(_) => "connection",
        }
    }

    pub fn shape_data(&self) -> Option<&ShapeData> {
        match &self.kind {
            ElementKind::Shape(data) => Some(data),
            _ => None,
        }
    }

    pub fn shape_data_mut(&mut self) -> Option<&mut ShapeData> {
        match &mut self.kind {
            ElementKind::Shape(data) => Some(data),
            _ => None,
        }
    }

    pub fn connection_data(&self) -> Option<&ConnectionData> {
        match &self.kind {
            ElementKind::Connection(data) => Some(data),
            _ => None,
        }
    }

    pub fn connection_data_mut(&mut self) -> Option<&mut ConnectionData> {
        match &mut self.kind {
            ElementKind::Connection(data) => Some(data),
            _ => None,
        }
    }

    /// Bounds eines Shapes (`None` für Roots und Connections).
    pub fn bounds(&self) -> Option<Bounds> {
        self.shape_data().map(|data| data.bounds)
    }

    pub fn host(&self) -> Option<&ElementId> {
        self.shape_data().and_then(|data| data.host.as_ref())
    }

    pub fn label_target(&self) -> Option<&ElementId> {
        self.shape_data().and_then(|data| data.label_target.as_ref())
    }

    /// Attacher eines Shapes (leer für andere Arten).
    pub fn attachers(&self) -> &[ElementId] {
        self.shape_data().map_or(&[], |data| data.attachers.as_slice())
    }

    /// Eingehende Connections (leer für andere Arten).
    pub fn incoming(&self) -> &[ElementId] {
        self.shape_data().map_or(&[], |data| data.incoming.as_slice())
    }

    /// Ausgehende Connections (leer für andere Arten).
    pub fn outgoing(&self) -> &[ElementId] {
        self.shape_data().map_or(&[], |data| data.outgoing.as_slice())
    }

    /// Wegpunkte einer Connection (leer für andere Arten).
    pub fn waypoints(&self) -> &[Waypoint] {
        self.connection_data().map_or(&[], |data| data.waypoints.as_slice())
    }

    /// Alle Connections des Shapes, eingehende zuerst.
    pub fn connections(&self) -> impl Iterator<Item = &ElementId> {
        self.incoming().iter().chain(self.outgoing().iter())
    }

    /// Umschließende Bounds (Shape-Bounds oder Waypoint-BBox).
    pub fn outline(&self) -> Option<Bounds> {
        match &self.kind {
            ElementKind::Root => None,
            ElementKind::Shape(data) => Some(data.bounds),
            ElementKind::Connection(data) => super::geometry::bounding_box(
                data.waypoints.iter().map(|wp| Bounds::from_point(wp.point)),
            ),
        }
    }
}

/// Entfernt `id` aus `collection` und liefert den bisherigen Index.
pub(crate) fn collection_remove(collection: &mut Vec<ElementId>, id: &str) -> Option<usize> {
    let index = collection.iter().position(|entry| entry.as_str() == id)?;
    collection.remove(index);
    Some(index)
}

/// Fügt `id` an `index` (oder am Ende) ein; ein vorhandener Eintrag wird verschoben.
pub(crate) fn collection_add(collection: &mut Vec<ElementId>, id: &ElementId, index: Option<usize>) {
    collection_remove(collection, id);
    match index {
        Some(index) if index < collection.len() => collection.insert(index, id.clone()),
        _ => collection.push(id.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_add_moves_existing_entry() {
        let mut list: Vec<ElementId> = vec!["a".into(), "b".into(), "c".into()];
        collection_add(&mut list, &"c".into(), Some(0));
        assert_eq!(list, vec![ElementId::from("c"), "a".into(), "b".into()]);

        assert_eq!(collection_remove(&mut list, "a"), Some(1));
        assert_eq!(collection_remove(&mut list, "x"), None);
    }

    #[test]
    fn waypoint_translate_moves_original_too() {
        let mut wp = Waypoint::new(10.0, 10.0).with_original(Vec2::new(12.0, 10.0));
        wp.translate(Vec2::new(5.0, -5.0));
        assert_eq!(wp.point, Vec2::new(15.0, 5.0));
        assert_eq!(wp.anchor(), Vec2::new(17.0, 5.0));
    }

    #[test]
    fn element_serializes_with_kind_tag() {
        let shape = Element::shape("s1", "task", Bounds::new(0.0, 0.0, 10.0, 10.0));
        let json = serde_json::to_value(&shape).expect("Serialisierung darf nicht fehlschlagen");
        assert_eq!(json["kind"], "shape");
        assert_eq!(json["type"], "task");

        let back: Element = serde_json::from_value(json).expect("Deserialisierung erwartet");
        assert_eq!(back, shape);
    }
}
