//! Geometrie-Hilfen: Bounds, Bounding-Box und proportionale Anker-Formeln.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Achsenparalleles Rechteck (x/y = linke obere Ecke).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    /// Erstellt neue Bounds.
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Erstellt Bounds mit gegebenem Mittelpunkt (linke obere Ecke gerundet wie beim Platzieren).
    pub fn from_center(center: Vec2, width: f32, height: f32) -> Self {
        Self::new(
            center.x - round_half_up(width / 2.0),
            center.y - round_half_up(height / 2.0),
            width,
            height,
        )
    }

    /// Linke obere Ecke.
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Breite und Höhe als Vektor.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Mittelpunkt der Bounds.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    /// Um `delta` verschobene Kopie.
    pub fn translate(&self, delta: Vec2) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }

    /// Kopie mit neuer linker oberer Ecke.
    pub fn with_position(&self, position: Vec2) -> Self {
        Self::new(position.x, position.y, self.width, self.height)
    }

    /// Prüft ob alle Werte endlich sind.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Prüft ob ein Punkt innerhalb (inklusive Rand) liegt.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Kleinste Bounds, die beide Rechtecke umschließen.
    pub fn union(&self, other: &Bounds) -> Bounds {
        let min_x = self.left().min(other.left());
        let min_y = self.top().min(other.top());
        let max_x = self.right().max(other.right());
        let max_y = self.bottom().max(other.bottom());
        Bounds::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Degenerierte Bounds eines einzelnen Punkts.
    pub fn from_point(point: Vec2) -> Bounds {
        Bounds::new(point.x, point.y, 0.0, 0.0)
    }
}

/// Rundet wie `Math.round` (x.5 wird aufgerundet, auch bei negativen Werten).
pub fn round_half_up(value: f32) -> f32 {
    (value + 0.5).floor()
}

/// Rundet beide Komponenten mit `round_half_up`.
pub fn round_point(point: Vec2) -> Vec2 {
    Vec2::new(round_half_up(point.x), round_half_up(point.y))
}

/// Bounding-Box über eine Menge von Rechtecken (`None` bei leerer Eingabe).
pub fn bounding_box<I>(items: I) -> Option<Bounds>
where
    I: IntoIterator<Item = Bounds>,
{
    items.into_iter().reduce(|acc, b| acc.union(&b))
}

/// Verhältnis neuer zu alter Ausdehnung; bei degenerierter alter Ausdehnung 1.0.
fn scale_ratio(new_extent: f32, old_extent: f32) -> f32 {
    if old_extent == 0.0 {
        1.0
    } else {
        new_extent / old_extent
    }
}

/// Berechnet den neuen Anker-Punkt nach Verschieben/Skalieren eines Elements.
///
/// Der Abstand des Punkts zum alten Mittelpunkt wird mit dem Verhältnis neuer
/// zu alter Breite/Höhe skaliert und auf den neuen Mittelpunkt addiert.
pub fn get_new_attach_point(point: Vec2, old_bounds: &Bounds, new_bounds: &Bounds) -> Vec2 {
    let old_center = old_bounds.center();
    let new_center = new_bounds.center();
    let old_delta = point - old_center;

    let new_delta = Vec2::new(
        old_delta.x * scale_ratio(new_bounds.width, old_bounds.width),
        old_delta.y * scale_ratio(new_bounds.height, old_bounds.height),
    );

    round_point(new_center + new_delta)
}

/// Berechnet das Verschiebe-Delta eines Attachers, wenn sein Host von
/// `old_bounds` auf `new_bounds` geändert wird.
///
/// Die relative Lage des Attacher-Mittelpunkts zum Host-Mittelpunkt bleibt
/// proportional erhalten (gleiche Formel wie bei Connection-Ankern).
pub fn get_new_attach_shape_delta(shape: &Bounds, old_bounds: &Bounds, new_bounds: &Bounds) -> Vec2 {
    let shape_center = shape.center();
    let old_center_delta = shape_center - old_bounds.center();

    let new_center_delta = Vec2::new(
        old_center_delta.x * scale_ratio(new_bounds.width, old_bounds.width),
        old_center_delta.y * scale_ratio(new_bounds.height, old_bounds.height),
    );
    let new_shape_center = new_bounds.center() + new_center_delta;

    round_point(new_shape_center - shape_center)
}
