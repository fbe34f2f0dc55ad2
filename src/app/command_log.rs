//! Begrenztes Log der App-Commands mit ihren Undo-Stufen.
//!
//! Jeder Eintrag hält fest, ob der Command eine neue Operation auf dem
//! Command-Stack angelegt, zurückgenommen oder wiederholt hat. So lässt
//! sich ein Szenario später in Undo-Schritte zerlegen.

use super::AppCommand;

/// Wirkung eines App-Commands auf den Command-Stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoStep {
    /// Keine Änderung am Stack (Selektion, Drag-Zwischenstand, Fehler)
    Unchanged,
    /// Neue Operation mit dieser ID
    Opened(u64),
    /// Operation mit dieser ID zurückgenommen
    Reverted(u64),
    /// Operation mit dieser ID wiederholt
    Replayed(u64),
}

impl UndoStep {
    /// Leitet die Stufe aus der zuletzt angewandten Operation vor und nach
    /// dem Command ab.
    pub fn between(command: &AppCommand, before: Option<u64>, after: Option<u64>) -> Self {
        if before == after {
            return Self::Unchanged;
        }
        match (command, before, after) {
            (AppCommand::Undo, Some(id), _) => Self::Reverted(id),
            (AppCommand::Redo, _, Some(id)) => Self::Replayed(id),
            (_, _, Some(id)) => Self::Opened(id),
            _ => Self::Unchanged,
        }
    }
}

/// Ein geloggter Command.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub command: AppCommand,
    pub step: UndoStep,
    /// Handler hat einen Fehler gemeldet
    pub failed: bool,
}

/// Speichert ausgeführte Commands in Reihenfolge.
#[derive(Debug, Default)]
pub struct CommandLog {
    entries: Vec<LogEntry>,
}

impl CommandLog {
    const MAX_ENTRIES: usize = 1000;

    pub fn new() -> Self {
        Self::default()
    }

    /// Hängt einen Eintrag an; bei Überlauf fällt die ältere Hälfte weg.
    pub fn record(&mut self, command: AppCommand, step: UndoStep, failed: bool) {
        if self.entries.len() >= Self::MAX_ENTRIES {
            self.entries.drain(..Self::MAX_ENTRIES / 2);
        }
        if failed {
            log::debug!("Command fehlgeschlagen: {:?}", command);
        }
        self.entries.push(LogEntry {
            command,
            step,
            failed,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// IDs der Operationen, die über dieses Log angelegt wurden.
    pub fn opened_operations(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.iter().filter_map(|entry| match entry.step {
            UndoStep::Opened(id) => Some(id),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn overflow_drops_oldest_half() {
        let mut log = CommandLog::new();
        for _ in 0..CommandLog::MAX_ENTRIES {
            log.record(AppCommand::ClearSelection, UndoStep::Unchanged, false);
        }
        log.record(AppCommand::Redo, UndoStep::Replayed(7), false);

        assert_eq!(log.len(), CommandLog::MAX_ENTRIES / 2 + 1);
        assert_eq!(
            log.entries().last().map(|entry| entry.step),
            Some(UndoStep::Replayed(7))
        );
    }

    #[test]
    fn step_is_derived_from_last_operation() {
        let moved = AppCommand::BeginMove {
            position: Vec2::ZERO,
        };
        assert_eq!(UndoStep::between(&moved, Some(2), Some(2)), UndoStep::Unchanged);
        assert_eq!(UndoStep::between(&AppCommand::EndMove, Some(2), Some(3)), UndoStep::Opened(3));
        assert_eq!(UndoStep::between(&AppCommand::Undo, Some(3), Some(2)), UndoStep::Reverted(3));
        assert_eq!(UndoStep::between(&AppCommand::Undo, Some(1), None), UndoStep::Reverted(1));
        assert_eq!(UndoStep::between(&AppCommand::Redo, Some(2), Some(3)), UndoStep::Replayed(3));
    }
}
