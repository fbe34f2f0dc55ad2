//! Schnittstelle zur visuellen Repräsentation der Elemente.
//!
//! Der Kern erzeugt und aktualisiert Grafiken nur über opake Handles; wie
//! gezeichnet wird, entscheidet die eingesetzte `GraphicsFactory`.

use super::element::Element;

/// Opaker Handle auf die Grafik eines Elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Graphics(u64);

impl Graphics {
    /// Rohwert des Handles.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Erzeugt, aktualisiert und entfernt Element-Grafiken.
pub trait GraphicsFactory {
    /// Erzeugt die Grafik für ein neu registriertes Element.
    fn create(&mut self, element: &Element) -> Graphics;

    /// Zeichnet ein geändertes Element neu.
    fn update(&mut self, _element: &Element, _graphics: Graphics) {}

    /// Entfernt die Grafik eines abgemeldeten Elements.
    fn remove(&mut self, _element: &Element, _graphics: Graphics) {}

    /// Zeichenfläche, die dem aktiven Root als Sekundär-Grafik zugeordnet wird.
    fn surface(&mut self) -> Graphics;
}

/// Grafik-Factory ohne Ausgabe; zählt nur Erzeugungen und Updates.
#[derive(Debug, Default)]
pub struct HeadlessGraphics {
    next_handle: u64,
    /// Anzahl der `update`-Aufrufe seit Start
    pub updates: usize,
    /// Anzahl aktuell lebender Grafiken
    pub live: usize,
}

impl HeadlessGraphics {
    fn next(&mut self) -> Graphics {
        self.next_handle += 1;
        Graphics(self.next_handle)
    }
}

impl GraphicsFactory for HeadlessGraphics {
    fn create(&mut self, _element: &Element) -> Graphics {
        self.live += 1;
        self.next()
    }

    fn update(&mut self, _element: &Element, _graphics: Graphics) {
        self.updates += 1;
    }

    fn remove(&mut self, _element: &Element, _graphics: Graphics) {
        self.live = self.live.saturating_sub(1);
    }

    fn surface(&mut self) -> Graphics {
        self.next()
    }
}
