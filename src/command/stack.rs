//! Buchhaltung des Command-Stacks: Handler, Interceptors, Aktionen, Undo/Redo-Zeiger.
//!
//! Die eigentliche Ausführung (Phasen, Verschachtelung, Rollback) liegt in
//! `execution.rs`, weil sie Zugriff auf den ganzen `Modeler` braucht.

use super::{CommandContext, CommandHandler, CommandInterceptor, Trigger};
use crate::core::ElementId;
use crate::error::ModelingError;
use std::collections::HashMap;
use std::rc::Rc;

/// Eine ausgeführte Aktion auf dem Stack.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    /// Operations-ID (alle Aktionen einer Top-Level-Operation teilen sie)
    pub id: u64,
    pub command: String,
    pub context: CommandContext,
}

struct InterceptorEntry {
    priority: i32,
    interceptor: Rc<dyn CommandInterceptor>,
}

/// Zustand der laufenden Top-Level-Operation.
#[derive(Default)]
struct Execution {
    /// Verschachtelungstiefe laufender Commands
    depth: usize,
    /// `true` während execute/revert (keine verschachtelten Commands)
    atomic: bool,
    operation_id: Option<u64>,
    trigger: Option<Trigger>,
    dirty: Vec<ElementId>,
    /// Stack-Länge beim Start (Rollback-Grenze)
    base_index: usize,
    /// Beim Start abgeschnittene Redo-Aktionen (für Rollback)
    redo_backup: Vec<Action>,
}

/// Command-Stack mit gruppiertem Undo/Redo.
pub struct CommandStack {
    handlers: HashMap<String, Rc<dyn CommandHandler>>,
    interceptors: Vec<InterceptorEntry>,
    actions: Vec<Action>,
    /// Anzahl angewandter Aktionen (Aktionen dahinter sind Redo-Einträge)
    stack_idx: usize,
    execution: Execution,
    next_operation_id: u64,
    /// Maximale Anzahl Undo-Operationen (0 = unbegrenzt)
    max_depth: usize,
}

impl std::fmt::Debug for CommandStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandStack")
            .field("handlers", &self.handlers.len())
            .field("interceptors", &self.interceptors.len())
            .field("actions", &self.actions.len())
            .field("stack_idx", &self.stack_idx)
            .finish()
    }
}

impl CommandStack {
    /// Erstellt einen leeren Stack mit maximaler Undo-Tiefe (0 = unbegrenzt).
    pub fn new(max_depth: usize) -> Self {
        Self {
            handlers: HashMap::new(),
            interceptors: Vec::new(),
            actions: Vec::new(),
            stack_idx: 0,
            execution: Execution::default(),
            next_operation_id: 0,
            max_depth,
        }
    }

    // ── Registrierung ──────────────────────────────────────────────

    /// Registriert einen Handler. Ein vorhandener Handler wird ersetzt.
    pub fn register_handler(&mut self, command: &str, handler: Rc<dyn CommandHandler>) {
        if self.handlers.insert(command.to_owned(), handler).is_some() {
            log::warn!("Handler für Command '{}' wurde überschrieben", command);
        }
    }

    /// Registriert einen Interceptor mit Priorität (höher = früher).
    pub fn register_interceptor(&mut self, priority: i32, interceptor: Rc<dyn CommandInterceptor>) {
        let index = self
            .interceptors
            .iter()
            .position(|entry| entry.priority < priority)
            .unwrap_or(self.interceptors.len());
        self.interceptors.insert(
            index,
            InterceptorEntry {
                priority,
                interceptor,
            },
        );
    }

    /// Prüft ob ein Handler registriert ist.
    pub fn has_handler(&self, command: &str) -> bool {
        self.handlers.contains_key(command)
    }

    pub(crate) fn handler(&self, command: &str) -> Result<Rc<dyn CommandHandler>, ModelingError> {
        self.handlers
            .get(command)
            .cloned()
            .ok_or_else(|| ModelingError::UnknownCommand(command.to_owned()))
    }

    /// Interceptors in Aufruf-Reihenfolge (bei Revert-Phasen umgekehrt).
    pub(crate) fn interceptors(&self, reverse: bool) -> Vec<Rc<dyn CommandInterceptor>> {
        let mut list: Vec<_> = self
            .interceptors
            .iter()
            .map(|entry| Rc::clone(&entry.interceptor))
            .collect();
        if reverse {
            list.reverse();
        }
        list
    }

    // ── Abfragen ───────────────────────────────────────────────────

    pub fn can_undo(&self) -> bool {
        self.stack_idx > 0
    }

    pub fn can_redo(&self) -> bool {
        self.stack_idx < self.actions.len()
    }

    /// Alle Aktionen (angewandte und Redo-Einträge).
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Nur die angewandten Aktionen.
    pub fn applied(&self) -> &[Action] {
        &self.actions[..self.stack_idx]
    }

    /// Operations-ID der zuletzt angewandten Operation.
    pub fn last_operation_id(&self) -> Option<u64> {
        self.applied().last().map(|action| action.id)
    }

    /// Anzahl angewandter Top-Level-Operationen.
    pub fn undo_depth(&self) -> usize {
        count_operations(self.applied())
    }

    /// Anzahl wiederholbarer Top-Level-Operationen.
    pub fn redo_depth(&self) -> usize {
        count_operations(&self.actions[self.stack_idx..])
    }

    /// Läuft gerade keine Operation?
    pub fn is_idle(&self) -> bool {
        self.execution.trigger.is_none()
    }

    pub(crate) fn is_atomic(&self) -> bool {
        self.execution.atomic
    }

    pub(crate) fn set_atomic(&mut self, atomic: bool) {
        self.execution.atomic = atomic;
    }

    pub(crate) fn action(&self, index: usize) -> Option<&Action> {
        self.actions.get(index)
    }

    pub(crate) fn undo_index(&self) -> Option<usize> {
        self.stack_idx.checked_sub(1)
    }

    pub(crate) fn redo_index(&self) -> Option<usize> {
        self.can_redo().then_some(self.stack_idx)
    }

    // ── Operations-Lebenszyklus ────────────────────────────────────

    /// Startet eine Top-Level-Operation.
    ///
    /// Bei `Trigger::Execute` werden die Redo-Einträge abgeschnitten und für
    /// einen eventuellen Rollback aufbewahrt.
    pub(crate) fn begin(&mut self, trigger: Trigger) {
        self.execution = Execution {
            trigger: Some(trigger),
            base_index: self.stack_idx,
            ..Execution::default()
        };
        if trigger == Trigger::Execute {
            self.next_operation_id += 1;
            self.execution.operation_id = Some(self.next_operation_id);
            self.execution.redo_backup = self.actions.split_off(self.stack_idx);
        }
    }

    /// Betritt einen (ggf. verschachtelten) Command.
    pub(crate) fn push_action(&mut self, command: &str) -> Result<(), ModelingError> {
        if self.execution.atomic {
            return Err(ModelingError::IllegalInvocation(command.to_owned()));
        }
        self.execution.depth += 1;
        Ok(())
    }

    pub(crate) fn pop_action(&mut self) {
        self.execution.depth = self.execution.depth.saturating_sub(1);
    }

    /// Legt eine ausgeführte Aktion ab und liefert ihren Index.
    pub(crate) fn executed_action(&mut self, command: &str, context: CommandContext) -> usize {
        self.actions.truncate(self.stack_idx);
        self.actions.push(Action {
            id: self.execution.operation_id.unwrap_or_default(),
            command: command.to_owned(),
            context,
        });
        self.stack_idx = self.actions.len();
        self.stack_idx - 1
    }

    /// Ersetzt den gespeicherten Kontext einer Aktion.
    pub(crate) fn update_context(&mut self, index: usize, context: CommandContext) {
        if let Some(action) = self.actions.get_mut(index) {
            action.context = context;
        }
    }

    /// Markiert eine Aktion als rückgängig gemacht.
    pub(crate) fn reverted_action(&mut self) {
        self.stack_idx = self.stack_idx.saturating_sub(1);
    }

    /// Markiert eine Aktion als wiederholt.
    pub(crate) fn redone_action(&mut self) {
        self.stack_idx = (self.stack_idx + 1).min(self.actions.len());
    }

    pub(crate) fn mark_dirty(&mut self, ids: Vec<ElementId>) {
        self.execution.dirty.extend(ids);
    }

    /// Indizes der Aktionen, die ein Rollback zurücknehmen muss (neueste zuerst).
    pub(crate) fn rollback_indices(&self) -> Vec<usize> {
        (self.execution.base_index..self.stack_idx).rev().collect()
    }

    /// Verwirft die Aktionen der fehlgeschlagenen Operation und stellt Redo wieder her.
    pub(crate) fn discard_operation(&mut self) {
        let base = self.execution.base_index;
        self.actions.truncate(base);
        self.stack_idx = base;
        let backup = std::mem::take(&mut self.execution.redo_backup);
        self.actions.extend(backup);
    }

    /// Beendet die Operation und liefert geänderte Elemente und Auslöser.
    pub(crate) fn finish(&mut self) -> (Vec<ElementId>, Trigger) {
        let execution = std::mem::take(&mut self.execution);
        self.trim_to_max_depth();
        (execution.dirty, execution.trigger.unwrap_or(Trigger::Execute))
    }

    /// Leert den Stack vollständig.
    pub fn clear(&mut self) {
        self.actions.clear();
        self.stack_idx = 0;
        self.execution = Execution::default();
    }

    /// Entfernt die ältesten Operationen, bis `max_depth` eingehalten ist.
    fn trim_to_max_depth(&mut self) {
        if self.max_depth == 0 {
            return;
        }
        while count_operations(self.applied()) > self.max_depth {
            let Some(oldest) = self.actions.first().map(|action| action.id) else {
                break;
            };
            let count = self
                .actions
                .iter()
                .take_while(|action| action.id == oldest)
                .count();
            self.actions.drain(..count);
            self.stack_idx = self.stack_idx.saturating_sub(count);
            log::debug!("Älteste Undo-Operation verworfen ({} Aktionen)", count);
        }
    }
}

/// Zählt zusammenhängende Gruppen gleicher Operations-ID.
fn count_operations(actions: &[Action]) -> usize {
    let mut count = 0;
    let mut last = None;
    for action in actions {
        if last != Some(action.id) {
            count += 1;
            last = Some(action.id);
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ElementsDeleteContext;

    fn dummy() -> CommandContext {
        CommandContext::ElementsDelete(ElementsDeleteContext {
            elements: Vec::new(),
        })
    }

    fn run_operation(stack: &mut CommandStack, actions: usize) {
        stack.begin(Trigger::Execute);
        for _ in 0..actions {
            stack.executed_action("elements.delete", dummy());
        }
        stack.finish();
    }

    #[test]
    fn nested_actions_share_operation_id() {
        let mut stack = CommandStack::new(0);
        run_operation(&mut stack, 3);
        run_operation(&mut stack, 1);

        assert_eq!(stack.actions().len(), 4);
        assert_eq!(stack.undo_depth(), 2);
        assert_eq!(stack.actions()[0].id, stack.actions()[2].id);
        assert_ne!(stack.actions()[0].id, stack.actions()[3].id);
    }

    #[test]
    fn max_depth_drops_oldest_operation() {
        let mut stack = CommandStack::new(2);
        run_operation(&mut stack, 2);
        run_operation(&mut stack, 1);
        run_operation(&mut stack, 3);

        assert_eq!(stack.undo_depth(), 2);
        assert_eq!(stack.actions().len(), 4);
        assert!(stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn discard_restores_redo_tail() {
        let mut stack = CommandStack::new(0);
        run_operation(&mut stack, 1);
        run_operation(&mut stack, 1);
        stack.reverted_action();
        assert!(stack.can_redo());

        stack.begin(Trigger::Execute);
        stack.executed_action("elements.delete", dummy());
        assert!(!stack.can_redo());
        assert_eq!(stack.rollback_indices(), vec![1]);

        stack.discard_operation();
        stack.finish();
        assert!(stack.can_redo());
        assert_eq!(stack.actions().len(), 2);
        assert_eq!(stack.redo_depth(), 1);
    }

    #[test]
    fn push_action_is_rejected_while_atomic() {
        let mut stack = CommandStack::new(0);
        stack.begin(Trigger::Execute);
        stack.set_atomic(true);
        assert_eq!(
            stack.push_action("shape.move"),
            Err(ModelingError::IllegalInvocation("shape.move".into()))
        );
        stack.set_atomic(false);
        assert!(stack.push_action("shape.move").is_ok());
    }
}
