use crate::core::{Bounds, ElementId};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// App-Intent und App-Command Events.
/// Intents sind Eingaben aus UI/System ohne direkte Mutationslogik.
///
/// Im Szenario-JSON über das Feld `intent` getaggt, z.B.
/// `{"intent": "undo_requested"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum AppIntent {
    // ── Selektion ───────────────────────────────────────────────
    /// Elemente selektieren (additiv = zur Selektion hinzufügen)
    SelectRequested {
        ids: Vec<ElementId>,
        #[serde(default)]
        additive: bool,
    },
    /// Selektion aufheben
    SelectionCleared,
    /// Alle Shapes und Connections des aktiven Roots selektieren
    SelectAllRequested,

    // ── Erzeugen ────────────────────────────────────────────────
    /// Neues Shape mit Mittelpunkt `position`
    ShapeCreateRequested {
        #[serde(default)]
        id: Option<ElementId>,
        element_type: String,
        position: Vec2,
        #[serde(default)]
        size: Option<Vec2>,
        #[serde(default)]
        parent: Option<ElementId>,
        /// Direkt an diesen Host heften (Boundary-Event o.ä.)
        #[serde(default)]
        host: Option<ElementId>,
    },
    /// Externes Label für ein Element
    LabelCreateRequested {
        target: ElementId,
        position: Vec2,
        #[serde(default)]
        text: Option<String>,
    },
    /// Zwei Shapes verbinden
    ConnectRequested {
        #[serde(default)]
        id: Option<ElementId>,
        source: ElementId,
        target: ElementId,
        #[serde(default)]
        element_type: Option<String>,
    },

    // ── Drag-Move ───────────────────────────────────────────────
    /// Move-Lifecycle Start: Drag der aktuellen Selektion beginnen
    DragStartRequested { position: Vec2 },
    /// Move-Lifecycle Update: Zeiger bewegt, optional über einem Ziel
    DragUpdateRequested {
        position: Vec2,
        #[serde(default)]
        hover: Option<ElementId>,
    },
    /// Move-Lifecycle Ende: Verschieben übernehmen
    DragEndRequested,
    /// Move-Lifecycle Abbruch: nichts ändern
    DragCancelRequested,

    // ── Ändern ──────────────────────────────────────────────────
    /// Shape auf neue Bounds setzen
    ResizeRequested { shape: ElementId, bounds: Bounds },
    /// Shape durch einen anderen Typ ersetzen
    ReplaceRequested {
        shape: ElementId,
        element_type: String,
        /// Attacher, die am neuen Shape hängen bleiben (`None` = alle)
        #[serde(default)]
        retain_attachments: Option<Vec<ElementId>>,
    },
    /// Shape an einen Host heften bzw. lösen (`host: None`)
    AttachRequested {
        shape: ElementId,
        #[serde(default)]
        host: Option<ElementId>,
    },
    /// Fachliche Properties eines Elements ändern (`null` entfernt)
    PropertiesUpdateRequested {
        element: ElementId,
        properties: Map<String, Value>,
    },

    // ── Löschen, Zwischenablage, Verlauf ────────────────────────
    /// Selektierte Elemente löschen
    DeleteSelectedRequested,
    /// Selektion in die Zwischenablage kopieren
    CopyRequested,
    /// Zwischenablage einfügen (`target: None` = aktives Root)
    PasteRequested {
        #[serde(default)]
        target: Option<ElementId>,
        position: Vec2,
    },
    /// Rückgängig
    UndoRequested,
    /// Wiederherstellen
    RedoRequested,
}
