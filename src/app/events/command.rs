use crate::core::{Bounds, ElementId};
use glam::Vec2;
use serde_json::{Map, Value};

/// Commands sind mutierende Schritte, die zentral ausgeführt werden.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    // ── Selektion ───────────────────────────────────────────────
    /// Selektion setzen oder erweitern
    SelectElements {
        ids: Vec<ElementId>,
        additive: bool,
    },
    /// Selektion leeren
    ClearSelection,
    /// Alles im aktiven Root selektieren
    SelectAll,

    // ── Erzeugen ────────────────────────────────────────────────
    /// Shape anlegen
    CreateShape {
        id: Option<ElementId>,
        element_type: String,
        position: Vec2,
        size: Option<Vec2>,
        parent: Option<ElementId>,
        host: Option<ElementId>,
    },
    /// Label anlegen
    CreateLabel {
        target: ElementId,
        position: Vec2,
        text: Option<String>,
    },
    /// Connection anlegen
    CreateConnection {
        id: Option<ElementId>,
        source: ElementId,
        target: ElementId,
        element_type: String,
    },

    // ── Drag-Move ───────────────────────────────────────────────
    /// Move-Operation für die Selektion starten
    BeginMove { position: Vec2 },
    /// Move-Operation aktualisieren (keine Mutation)
    UpdateMove {
        position: Vec2,
        hover: Option<ElementId>,
    },
    /// Move-Operation übernehmen (ein `elements.move`)
    EndMove,
    /// Move-Operation verwerfen
    CancelMove,

    // ── Ändern ──────────────────────────────────────────────────
    /// Shape skalieren
    ResizeShape { shape: ElementId, bounds: Bounds },
    /// Shape ersetzen
    ReplaceShape {
        shape: ElementId,
        element_type: String,
        retain_attachments: Option<Vec<ElementId>>,
    },
    /// Anheften bzw. Lösen
    UpdateAttachment {
        shape: ElementId,
        host: Option<ElementId>,
    },
    /// Properties ändern
    UpdateProperties {
        element: ElementId,
        properties: Map<String, Value>,
    },

    // ── Löschen, Zwischenablage, Verlauf ────────────────────────
    /// Elemente löschen (ein Undo-Schritt)
    DeleteElements { ids: Vec<ElementId> },
    /// Elemente kopieren
    CopyElements { ids: Vec<ElementId> },
    /// Zwischenablage einfügen
    PasteElements {
        target: Option<ElementId>,
        position: Vec2,
    },
    /// Undo-Schritt
    Undo,
    /// Redo-Schritt
    Redo,
}
