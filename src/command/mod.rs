//! Transaktionaler Command-Stack.
//!
//! Commands werden über ihren Namen an registrierte `CommandHandler`
//! dispatcht. Eine Top-Level-Operation kann verschachtelte Commands auslösen
//! (in pre/post-Phasen); alle Aktionen einer Operation teilen sich eine ID und
//! werden gemeinsam rückgängig gemacht bzw. wiederholt.

pub mod context;
mod execution;
pub mod stack;

pub use context::*;
pub use stack::{Action, CommandStack};

use crate::core::ElementId;
use crate::error::ModelingError;
use crate::modeling::Modeler;
use serde::Serialize;

// ── Command-Namen ──────────────────────────────────────────────────

pub const SHAPE_CREATE: &str = "shape.create";
pub const SHAPE_DELETE: &str = "shape.delete";
pub const SHAPE_MOVE: &str = "shape.move";
pub const SHAPE_RESIZE: &str = "shape.resize";
pub const SHAPE_REPLACE: &str = "shape.replace";
pub const LABEL_CREATE: &str = "label.create";
pub const CONNECTION_CREATE: &str = "connection.create";
pub const CONNECTION_DELETE: &str = "connection.delete";
pub const CONNECTION_MOVE: &str = "connection.move";
pub const CONNECTION_LAYOUT: &str = "connection.layout";
pub const CONNECTION_RECONNECT: &str = "connection.reconnect";
pub const ELEMENTS_MOVE: &str = "elements.move";
pub const ELEMENTS_CREATE: &str = "elements.create";
pub const ELEMENTS_DELETE: &str = "elements.delete";
pub const ELEMENTS_PASTE: &str = "elements.paste";
pub const ATTACHMENT_UPDATE: &str = "element.updateAttachment";
pub const PROPERTIES_UPDATE: &str = "element.updateProperties";

/// Auslöser einer abgeschlossenen Stack-Operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Execute,
    Undo,
    Redo,
    Clear,
}

/// Lebenszyklus-Phasen, in die sich Interceptors einhängen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    PreExecute,
    PreExecuted,
    /// Atomar: keine verschachtelten Commands
    Execute,
    /// Atomar: keine verschachtelten Commands
    Executed,
    PostExecute,
    PostExecuted,
    /// Atomar, Interceptors laufen in umgekehrter Reihenfolge
    Revert,
    /// Atomar, Interceptors laufen in umgekehrter Reihenfolge
    Reverted,
}

impl Phase {
    /// Revert-Phasen rufen Interceptors in umgekehrter Prioritäts-Reihenfolge auf.
    pub fn is_revert(self) -> bool {
        matches!(self, Phase::Revert | Phase::Reverted)
    }
}

/// Handler eines benannten Commands.
///
/// `execute` und `revert` müssen exakt invers zueinander sein und dürfen
/// keine weiteren Commands auslösen. Verschachtelte Commands gehören in
/// `pre_execute` bzw. `post_execute`.
pub trait CommandHandler {
    /// Optionales Veto vor jeder Phase.
    fn can_execute(&self, _modeler: &Modeler, _context: &CommandContext) -> bool {
        true
    }

    fn pre_execute(
        &self,
        _modeler: &mut Modeler,
        _context: &mut CommandContext,
    ) -> Result<(), ModelingError> {
        Ok(())
    }

    /// Führt die Mutation aus und liefert die geänderten Elemente.
    fn execute(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError>;

    fn post_execute(
        &self,
        _modeler: &mut Modeler,
        _context: &mut CommandContext,
    ) -> Result<(), ModelingError> {
        Ok(())
    }

    /// Macht `execute` rückgängig und liefert die geänderten Elemente.
    fn revert(
        &self,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<Vec<ElementId>, ModelingError>;
}

/// Querschnitts-Verhalten, das sich in die Phasen beliebiger Commands einhängt.
pub trait CommandInterceptor {
    /// Wird für jede Phase jedes Commands aufgerufen.
    fn intercept(
        &self,
        phase: Phase,
        command: &str,
        modeler: &mut Modeler,
        context: &mut CommandContext,
    ) -> Result<(), ModelingError>;

    /// Veto vor der Ausführung (`None` = keine Meinung).
    fn can_execute(&self, _command: &str, _modeler: &Modeler, _context: &CommandContext) -> Option<bool> {
        None
    }
}
