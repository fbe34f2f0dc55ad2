//! Regel-Kollaborator: entscheidet, ob eine Aktion erlaubt ist.
//!
//! Regeln werden nicht als Fehler signalisiert. `DontCare` bedeutet "keine
//! Meinung" und wird von Aufrufern wie `Yes` behandelt.

use crate::copy_paste::CopyTree;
use crate::core::{Bounds, Canvas, ElementId};
use glam::Vec2;
use indexmap::IndexSet;

// ── Regel-Namen ────────────────────────────────────────────────────

pub const ELEMENT_COPY: &str = "element.copy";
pub const ELEMENTS_COPY: &str = "elements.copy";
pub const ELEMENTS_PASTE: &str = "elements.paste";
pub const ELEMENTS_MOVE: &str = "elements.move";
pub const CONNECTION_CREATE: &str = "connection.create";
pub const CONNECTION_RECONNECT: &str = "connection.reconnect";
pub const SHAPE_RESIZE: &str = "shape.resize";

/// Antwort einer Regel.
#[derive(Debug, Clone, PartialEq)]
pub enum Allowed {
    Yes,
    No,
    /// Keine Meinung
    DontCare,
    /// Erlaubt, und zwar als Anheften an das Ziel (nur `elements.move`)
    Attach,
    /// Nur diese Elemente sind erlaubt (z.B. `elements.copy`)
    Only(Vec<ElementId>),
}

impl Allowed {
    /// Alles außer `No` gilt als erlaubt.
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Allowed::No)
    }
}

/// Kontext einer Regel-Anfrage.
#[derive(Debug, Clone, Copy)]
pub enum RuleContext<'a> {
    /// Einzelnes Element beim Kopieren; `elements` = bisher übernommene
    /// Elemente einschließlich `element`
    ElementCopy {
        element: &'a ElementId,
        elements: &'a IndexSet<ElementId>,
    },
    ElementsCopy {
        elements: &'a [ElementId],
    },
    ElementsPaste {
        tree: &'a CopyTree,
        target: &'a ElementId,
    },
    ElementsMove {
        shapes: &'a [ElementId],
        target: Option<&'a ElementId>,
        position: Option<Vec2>,
    },
    ConnectionCreate {
        source: &'a ElementId,
        target: &'a ElementId,
    },
    ConnectionReconnect {
        connection: &'a ElementId,
        source: &'a ElementId,
        target: &'a ElementId,
    },
    ShapeResize {
        shape: &'a ElementId,
        new_bounds: Bounds,
    },
}

/// Beantwortet Regel-Anfragen.
pub trait Rules {
    fn allowed(&self, action: &str, context: &RuleContext<'_>, canvas: &Canvas) -> Allowed;
}

type RuleFn = Box<dyn Fn(&RuleContext<'_>, &Canvas) -> Allowed>;

struct RuleEntry {
    actions: Vec<String>,
    priority: i32,
    rule: RuleFn,
}

/// Regel-Provider mit priorisierten Regeln pro Aktion.
///
/// Die erste Regel (höchste Priorität zuerst) mit einer anderen Antwort als
/// `DontCare` entscheidet. Ohne passende Regel lautet die Antwort `DontCare`.
#[derive(Default)]
pub struct RuleProvider {
    rules: Vec<RuleEntry>,
}

impl std::fmt::Debug for RuleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleProvider")
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl RuleProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registriert eine Regel für mehrere Aktionen.
    pub fn add_rule<F>(&mut self, actions: &[&str], priority: i32, rule: F)
    where
        F: Fn(&RuleContext<'_>, &Canvas) -> Allowed + 'static,
    {
        let index = self
            .rules
            .iter()
            .position(|entry| entry.priority < priority)
            .unwrap_or(self.rules.len());
        self.rules.insert(
            index,
            RuleEntry {
                actions: actions.iter().map(|a| (*a).to_owned()).collect(),
                priority,
                rule: Box::new(rule),
            },
        );
    }

    /// Builder-Variante von `add_rule`.
    pub fn with_rule<F>(mut self, actions: &[&str], priority: i32, rule: F) -> Self
    where
        F: Fn(&RuleContext<'_>, &Canvas) -> Allowed + 'static,
    {
        self.add_rule(actions, priority, rule);
        self
    }
}

impl Rules for RuleProvider {
    fn allowed(&self, action: &str, context: &RuleContext<'_>, canvas: &Canvas) -> Allowed {
        self.rules
            .iter()
            .filter(|entry| entry.actions.iter().any(|a| a == action))
            .map(|entry| (entry.rule)(context, canvas))
            .find(|verdict| *verdict != Allowed::DontCare)
            .unwrap_or(Allowed::DontCare)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highest_priority_non_dont_care_wins() {
        let provider = RuleProvider::new()
            .with_rule(&[ELEMENTS_MOVE], 500, |_, _| Allowed::No)
            .with_rule(&[ELEMENTS_MOVE], 1500, |_, _| Allowed::DontCare)
            .with_rule(&[ELEMENTS_MOVE, SHAPE_RESIZE], 1000, |_, _| Allowed::Attach);
        let canvas = Canvas::headless();
        let ctx = RuleContext::ElementsMove {
            shapes: &[],
            target: None,
            position: None,
        };

        assert_eq!(provider.allowed(ELEMENTS_MOVE, &ctx, &canvas), Allowed::Attach);
        assert_eq!(
            provider.allowed(ELEMENTS_COPY, &ctx, &canvas),
            Allowed::DontCare
        );
        assert!(Allowed::DontCare.is_allowed());
        assert!(!Allowed::No.is_allowed());
    }
}
