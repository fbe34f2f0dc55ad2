//! Flache, serialisierbare Beschreibung eines kopierten Elements.
//!
//! Die Basis-Beschreibung (Geometrie, Priorität, Parent) entsteht beim
//! Bauen des Kopier-Baums. Zusätzliche `DescriptorBuilder` können den
//! Deskriptor ergänzen und beim Einfügen Referenzen umschreiben.

use crate::core::{bounding_box, Bounds, Canvas, Element, ElementId, Waypoint};
use glam::Vec2;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unabhängige Shapes
pub const PRIORITY_SHAPE: u8 = 1;
/// Angeheftete Shapes (Host muss zuerst existieren)
pub const PRIORITY_ATTACHER: u8 = 2;
/// Connections (Source/Target müssen zuerst existieren)
pub const PRIORITY_CONNECTION: u8 = 3;
/// Labels (Label-Target muss zuerst existieren)
pub const PRIORITY_LABEL: u8 = 4;

/// Art-spezifische Geometrie eines Deskriptors (absolute Koordinaten).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DescriptorGeometry {
    Shape {
        bounds: Bounds,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        host: Option<ElementId>,
    },
    Label {
        bounds: Bounds,
        label_target: ElementId,
    },
    Connection {
        source: ElementId,
        target: ElementId,
        waypoints: Vec<Waypoint>,
    },
}

/// Positions-Delta eines Deskriptors beim Einfügen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyDelta {
    /// Linke obere Ecke relativ zum Mittelpunkt der Kopie
    Center(Vec2),
    /// Linke obere Ecke relativ zum Anker des Label-Targets
    Target(Vec2),
    /// Ein Delta pro Wegpunkt, relativ zum Mittelpunkt der Kopie
    Waypoints(Vec<Vec2>),
}

/// Beschreibung eines Elements im Kopier-Baum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Original-ID (wird beim Einfügen verworfen)
    pub id: ElementId,
    #[serde(rename = "type")]
    pub element_type: String,
    pub priority: u8,
    /// Parent, sofern er selbst mitkopiert wurde
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ElementId>,
    #[serde(default)]
    pub hidden: bool,
    pub geometry: DescriptorGeometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<CopyDelta>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl Descriptor {
    /// Basis-Beschreibung eines registrierten Elements (`None` für Roots).
    pub fn from_element(element: &Element) -> Option<Self> {
        let (priority, geometry) = if let Some(data) = element.connection_data() {
            (
                PRIORITY_CONNECTION,
                DescriptorGeometry::Connection {
                    source: data.source.clone(),
                    target: data.target.clone(),
                    waypoints: data.waypoints.clone(),
                },
            )
        } else {
            let data = element.shape_data()?;
            match (&data.label_target, &data.host) {
                (Some(target), _) => (
                    PRIORITY_LABEL,
                    DescriptorGeometry::Label {
                        bounds: data.bounds,
                        label_target: target.clone(),
                    },
                ),
                (None, Some(host)) => (
                    PRIORITY_ATTACHER,
                    DescriptorGeometry::Shape {
                        bounds: data.bounds,
                        host: Some(host.clone()),
                    },
                ),
                (None, None) => (
                    PRIORITY_SHAPE,
                    DescriptorGeometry::Shape {
                        bounds: data.bounds,
                        host: None,
                    },
                ),
            }
        };

        Some(Self {
            id: element.id.clone(),
            element_type: element.element_type.clone(),
            priority,
            parent: None,
            hidden: element.hidden,
            geometry,
            delta: None,
            properties: element.properties.clone(),
        })
    }

    pub fn is_connection(&self) -> bool {
        matches!(self.geometry, DescriptorGeometry::Connection { .. })
    }

    pub fn is_label(&self) -> bool {
        matches!(self.geometry, DescriptorGeometry::Label { .. })
    }

    /// Umriss: Bounds bzw. Bounding-Box der Wegpunkte.
    pub fn outline(&self) -> Option<Bounds> {
        match &self.geometry {
            DescriptorGeometry::Shape { bounds, .. } | DescriptorGeometry::Label { bounds, .. } => {
                Some(*bounds)
            }
            DescriptorGeometry::Connection { waypoints, .. } => {
                bounding_box(waypoints.iter().map(|wp| Bounds::from_point(wp.point)))
            }
        }
    }

    /// Verschiebt die absolute Geometrie um `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        match &mut self.geometry {
            DescriptorGeometry::Shape { bounds, .. } | DescriptorGeometry::Label { bounds, .. } => {
                *bounds = bounds.translate(delta);
            }
            DescriptorGeometry::Connection { waypoints, .. } => {
                for waypoint in waypoints {
                    waypoint.translate(delta);
                }
            }
        }
    }
}

/// Erweiterbarer Baustein der Deskriptor-Pipeline.
pub trait DescriptorBuilder {
    /// Ergänzt den Basis-Deskriptor beim Kopieren.
    fn describe(&self, _canvas: &Canvas, _element: &Element, _descriptor: &mut Descriptor) {}

    /// Liefert nach dem Einfügen zu setzende Properties des neuen Elements.
    ///
    /// `created` ordnet Original-IDs den beim Einfügen erzeugten IDs zu.
    fn resolve_references(
        &self,
        _descriptor: &Descriptor,
        _created: &IndexMap<ElementId, ElementId>,
    ) -> Option<Map<String, Value>> {
        None
    }
}

/// Schreibt ID-wertige Properties (z.B. `default` eines Sequenzflusses)
/// auf die beim Einfügen erzeugten IDs um.
///
/// Zeigt die Referenz auf ein nicht mitkopiertes Element, wird sie entfernt.
#[derive(Debug, Clone, Default)]
pub struct ReferenceDescriptor {
    keys: Vec<String>,
}

impl ReferenceDescriptor {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl DescriptorBuilder for ReferenceDescriptor {
    fn resolve_references(
        &self,
        descriptor: &Descriptor,
        created: &IndexMap<ElementId, ElementId>,
    ) -> Option<Map<String, Value>> {
        let mut patch = Map::new();
        for key in &self.keys {
            let Some(Value::String(reference)) = descriptor.properties.get(key) else {
                continue;
            };
            let value = match created.get(reference.as_str()) {
                Some(new_id) => Value::String(new_id.to_string()),
                None => Value::Null,
            };
            patch.insert(key.clone(), value);
        }
        (!patch.is_empty()).then_some(patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attacher_gets_attacher_priority() {
        let mut element = Element::shape("b", "event", Bounds::new(0.0, 0.0, 36.0, 36.0));
        if let Some(data) = element.shape_data_mut() {
            data.host = Some(ElementId::from("a"));
        }
        let descriptor = Descriptor::from_element(&element).expect("Deskriptor erwartet");
        assert_eq!(descriptor.priority, PRIORITY_ATTACHER);
        assert!(Descriptor::from_element(&Element::root("r")).is_none());
    }

    #[test]
    fn reference_descriptor_remaps_and_drops() {
        let mut created = IndexMap::new();
        created.insert(ElementId::from("flow_1"), ElementId::from("connection_7"));

        let element = Element::shape("gw", "gateway", Bounds::new(0.0, 0.0, 50.0, 50.0))
            .with_property("default", "flow_1")
            .with_property("other", "flow_2");
        let descriptor = Descriptor::from_element(&element).expect("Deskriptor erwartet");

        let builder = ReferenceDescriptor::new(["default", "other"]);
        let patch = builder
            .resolve_references(&descriptor, &created)
            .expect("Patch erwartet");
        assert_eq!(patch.get("default"), Some(&Value::from("connection_7")));
        assert_eq!(patch.get("other"), Some(&Value::Null));
    }
}
