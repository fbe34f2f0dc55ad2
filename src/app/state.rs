//! Application State: zentrale Datenhaltung.

use super::CommandLog;
use crate::core::{DiagramSnapshot, ElementId};
use crate::modeling::Modeler;
use crate::rules::Allowed;
use crate::shared::ModelingOptions;
use glam::Vec2;
use indexmap::IndexSet;

/// Auswahlbezogener Anwendungszustand
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    /// Selektierte Elemente in Auswahl-Reihenfolge
    pub selected: IndexSet<ElementId>,
}

impl SelectionState {
    /// Erstellt einen leeren Selektionszustand.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Selektion als Liste (für Modeling-Aufrufe).
    pub fn ids(&self) -> Vec<ElementId> {
        self.selected.iter().cloned().collect()
    }
}

/// Zustand einer laufenden Drag-Move-Operation.
///
/// Lebt nur zwischen Start und Ende/Abbruch. Bis zum Ende wird das
/// Diagramm nicht verändert.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOperation {
    /// Zu verschiebende Shapes
    pub shapes: Vec<ElementId>,
    /// Zeigerposition beim Start
    pub start: Vec2,
    /// Aktuelles Delta seit dem Start
    pub delta: Vec2,
    /// Element unter dem Zeiger
    pub hover: Option<ElementId>,
    /// Regel-Antwort für das aktuelle Ziel
    pub allowed: Allowed,
}

/// Hauptzustand der Anwendung
#[derive(Debug)]
pub struct AppState {
    /// Modeling-Session (Diagramm, Command-Stack, Zwischenablage)
    pub modeler: Modeler,
    /// Selektion
    pub selection: SelectionState,
    /// Laufende Drag-Move-Operation
    pub drag: Option<MoveOperation>,
    /// Log aller ausgeführten App-Commands
    pub command_log: CommandLog,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Erstellt einen leeren AppState mit Standard-Optionen.
    pub fn new() -> Self {
        Self::with_options(ModelingOptions::default())
    }

    /// Erstellt einen AppState mit eigenen Optionen.
    pub fn with_options(options: ModelingOptions) -> Self {
        Self::with_modeler(Modeler::new(options))
    }

    /// Erstellt einen AppState über einer vorbereiteten Session
    /// (z.B. mit eigenen Regeln).
    pub fn with_modeler(modeler: Modeler) -> Self {
        Self {
            modeler,
            selection: SelectionState::new(),
            drag: None,
            command_log: CommandLog::new(),
        }
    }

    /// Gibt `true` zurück, wenn ein Undo möglich ist.
    pub fn can_undo(&self) -> bool {
        self.modeler.can_undo()
    }

    /// Gibt `true` zurück, wenn ein Redo möglich ist.
    pub fn can_redo(&self) -> bool {
        self.modeler.can_redo()
    }

    /// Serialisierbarer Schnappschuss des Diagramms.
    pub fn snapshot(&self) -> DiagramSnapshot {
        self.modeler.canvas().snapshot()
    }

    /// Entfernt nicht mehr existierende Elemente aus der Selektion.
    pub fn prune_selection(&mut self) {
        let canvas = self.modeler.canvas();
        self.selection
            .selected
            .retain(|id| canvas.get(id).is_some());
    }
}
