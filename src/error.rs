//! Fehler-Taxonomie des Editier-Kerns.
//!
//! Invarianten-Verletzungen (fehlende/doppelte IDs, fehlende Endpunkte, ungültige
//! Bounds) brechen ein Command vor jeder Mutation ab. Regel-Ablehnungen sind
//! keine Fehler, sondern werden über `Allowed::No` bzw. Events signalisiert.

use crate::core::ElementId;

/// Synchrone Fehler des Modeling-Kerns.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelingError {
    /// Element ohne (oder mit leerer) ID
    #[error("Element ohne ID kann nicht registriert werden")]
    MissingId,
    /// ID ist in der Registry bereits vergeben
    #[error("Element-ID <{0}> ist bereits vergeben")]
    DuplicateId(ElementId),
    /// ID ist nicht registriert
    #[error("Element <{0}> nicht gefunden")]
    ElementNotFound(ElementId),
    /// Element hat die falsche Art (z.B. Connection statt Shape)
    #[error("Element <{id}> ist kein {expected}")]
    UnexpectedKind {
        id: ElementId,
        expected: &'static str,
    },
    /// Shape/Connection ohne Parent
    #[error("Parent erforderlich")]
    MissingParent,
    /// Connection ohne existierende Source/Target
    #[error("Verbindung <{0}> benötigt existierende Source und Target")]
    MissingEndpoint(ElementId),
    /// Label-Target ist bereits beschriftet
    #[error("Label-Target <{target}> hat bereits das Label <{label}>")]
    LabelAlreadyPresent { target: ElementId, label: ElementId },
    /// Bounds enthalten nicht-endliche Werte
    #[error("Bounds müssen endliche Werte für x, y, width und height haben")]
    InvalidBounds,
    /// Resize unter die Mindestgröße
    #[error("Breite und Höhe dürfen {min_width}x{min_height} nicht unterschreiten")]
    BoundsTooSmall { min_width: f32, min_height: f32 },
    /// Kein Handler für den Command-Namen registriert
    #[error("Kein Command-Handler für <{0}> registriert")]
    UnknownCommand(String),
    /// Handler erhielt einen Kontext eines anderen Commands
    #[error("Command <{command}> erhielt einen unpassenden Kontext")]
    ContextMismatch { command: String },
    /// Verschachtelte Ausführung in der execute/revert-Phase
    #[error("Unzulässiger Aufruf in der execute/revert-Phase (Command <{0}>)")]
    IllegalInvocation(String),
    /// Handler oder Interceptor hat die Ausführung abgelehnt
    #[error("Command <{0}> kann nicht ausgeführt werden")]
    CannotExecute(String),
    /// Element hat noch Kinder, Verbindungen, Attacher oder ein Label
    #[error("Element <{0}> hat noch Kinder, Verbindungen, Attacher oder ein Label")]
    ElementInUse(ElementId),
    /// Kein aktives Root-Element vorhanden
    #[error("Kein aktives Root-Element")]
    NoActiveRoot,
}

impl ModelingError {
    /// Kurzform für einen unpassenden Command-Kontext.
    pub fn mismatch(command: &str) -> Self {
        Self::ContextMismatch {
            command: command.to_owned(),
        }
    }
}
