//! Kopieren in die Zwischenablage und Einfügen aus ihr.

use super::tree::{create_tree, CopyTree};
use crate::command::{ElementsPasteContext, ELEMENTS_PASTE};
use crate::core::{ElementId, EventPayload};
use crate::error::ModelingError;
use crate::modeling::Modeler;
use crate::rules::{self, Allowed, RuleContext};
use glam::Vec2;
use indexmap::IndexMap;

/// Ergebnis eines Einfüge-Versuchs.
#[derive(Debug, Clone, PartialEq)]
pub enum PasteOutcome {
    /// Zwischenablage leer
    Empty,
    /// Regel `elements.paste` hat abgelehnt (`elements.paste.rejected` gefeuert)
    Rejected,
    /// Eingefügt; Original-ID → neue ID
    Pasted(IndexMap<ElementId, ElementId>),
}

impl Modeler {
    /// Kopiert eine Selektion in die Zwischenablage.
    ///
    /// Die Regel `elements.copy` kann das Kopieren verbieten (leerer Baum)
    /// oder die Selektion auf eine Erlaubt-Liste einschränken.
    pub fn copy(&mut self, elements: &[ElementId]) -> CopyTree {
        let verdict = self.allowed(
            rules::ELEMENTS_COPY,
            &RuleContext::ElementsCopy { elements },
        );
        let tree = match verdict {
            Allowed::No => {
                log::debug!("Kopieren abgelehnt");
                CopyTree::default()
            }
            Allowed::Only(only) => create_tree(
                &self.canvas,
                self.rules.as_ref(),
                &self.descriptor_builders,
                &only,
            ),
            _ => create_tree(
                &self.canvas,
                self.rules.as_ref(),
                &self.descriptor_builders,
                elements,
            ),
        };

        self.canvas
            .fire("elements.copy", EventPayload::Copy { tree: tree.clone() });
        self.clipboard.set(tree.clone());
        self.canvas
            .fire("elements.copied", EventPayload::Copy { tree: tree.clone() });

        log::info!("{} Elemente kopiert", tree.len());
        tree
    }

    /// Fügt den Inhalt der Zwischenablage unter `target` ein, mit dem
    /// Mittelpunkt der Kopie auf `position` (Standard-Ziel: aktives Root).
    pub fn paste(
        &mut self,
        target: Option<&ElementId>,
        position: Vec2,
    ) -> Result<PasteOutcome, ModelingError> {
        let Some(tree) = self.clipboard.get().filter(|t| !t.is_empty()).cloned() else {
            log::debug!("Einfügen: Zwischenablage leer");
            return Ok(PasteOutcome::Empty);
        };
        let target = match target {
            Some(target) => target.clone(),
            None => self.root()?,
        };

        let verdict = self.allowed(
            rules::ELEMENTS_PASTE,
            &RuleContext::ElementsPaste {
                tree: &tree,
                target: &target,
            },
        );
        if verdict == Allowed::No {
            log::warn!("Einfügen in '{}' abgelehnt", target);
            self.canvas.fire(
                "elements.paste.rejected",
                EventPayload::PasteRejected {
                    tree,
                    target,
                    position,
                },
            );
            return Ok(PasteOutcome::Rejected);
        }

        let context = self.execute(
            ELEMENTS_PASTE,
            ElementsPasteContext {
                tree,
                target,
                position,
                created: IndexMap::new(),
            },
        )?;
        let created = context.as_elements_paste(ELEMENTS_PASTE)?.created.clone();

        log::info!("{} Elemente eingefügt", created.len());
        Ok(PasteOutcome::Pasted(created))
    }
}
