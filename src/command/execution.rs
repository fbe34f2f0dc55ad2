//! Ausführung, Undo und Redo von Commands auf einem `Modeler`.
//!
//! Ablauf einer Ausführung:
//! canExecute → preExecute → preExecuted → [execute → executed] →
//! postExecute → postExecuted. Die eckigen Klammern markieren den atomaren
//! Abschnitt, in dem keine weiteren Commands ausgelöst werden dürfen.
//! Schlägt eine Top-Level-Operation fehl, werden alle bereits ausgeführten
//! Aktionen in umgekehrter Reihenfolge zurückgenommen.

use super::{CommandContext, CommandHandler, Phase, Trigger};
use crate::core::EventPayload;
use crate::error::ModelingError;
use crate::modeling::Modeler;
use std::rc::Rc;

impl Modeler {
    /// Führt einen Command aus und liefert den (ergänzten) Kontext zurück.
    ///
    /// Innerhalb von pre/post-Phasen aufgerufen, wird der Command Teil der
    /// laufenden Operation.
    pub fn execute(
        &mut self,
        command: &str,
        context: impl Into<CommandContext>,
    ) -> Result<CommandContext, ModelingError> {
        let context = context.into();

        if self.stack.is_atomic() {
            return Err(ModelingError::IllegalInvocation(command.to_owned()));
        }

        let top_level = self.stack.is_idle();
        if top_level {
            self.stack.begin(Trigger::Execute);
        }

        let result = self.internal_execute(command, context);

        if !top_level {
            return result;
        }

        match result {
            Ok(context) => {
                self.finish_operation();
                log::debug!("Command '{}' ausgeführt", command);
                Ok(context)
            }
            Err(err) => {
                log::warn!("Command '{}' fehlgeschlagen, Rollback: {}", command, err);
                self.rollback_operation();
                Err(err)
            }
        }
    }

    /// Prüft Handler- und Interceptor-Vetos, ohne auszuführen.
    pub fn can_execute(&self, command: &str, context: &CommandContext) -> bool {
        let Ok(handler) = self.stack.handler(command) else {
            return false;
        };
        self.check_can_execute(command, &handler, context)
    }

    fn check_can_execute(
        &self,
        command: &str,
        handler: &Rc<dyn CommandHandler>,
        context: &CommandContext,
    ) -> bool {
        for interceptor in self.stack.interceptors(false) {
            if let Some(verdict) = interceptor.can_execute(command, self, context) {
                return verdict;
            }
        }
        handler.can_execute(self, context)
    }

    fn internal_execute(
        &mut self,
        command: &str,
        mut context: CommandContext,
    ) -> Result<CommandContext, ModelingError> {
        let handler = self.stack.handler(command)?;
        self.stack.push_action(command)?;
        let result = self.run_phases(command, &handler, &mut context);
        self.stack.pop_action();
        result.map(|_| context)
    }

    fn run_phases(
        &mut self,
        command: &str,
        handler: &Rc<dyn CommandHandler>,
        context: &mut CommandContext,
    ) -> Result<(), ModelingError> {
        if !self.check_can_execute(command, handler, context) {
            return Err(ModelingError::CannotExecute(command.to_owned()));
        }

        self.fire_phase(Phase::PreExecute, command, context)?;
        handler.pre_execute(self, context)?;
        self.fire_phase(Phase::PreExecuted, command, context)?;

        self.stack.set_atomic(true);
        let executed = self.atomic_execute(command, handler, context);
        self.stack.set_atomic(false);
        let index = executed?;

        self.fire_phase(Phase::PostExecute, command, context)?;
        handler.post_execute(self, context)?;
        self.fire_phase(Phase::PostExecuted, command, context)?;

        // Kontext inkl. Ergänzungen aus den Post-Phasen ablegen
        self.stack.update_context(index, context.clone());
        Ok(())
    }

    fn atomic_execute(
        &mut self,
        command: &str,
        handler: &Rc<dyn CommandHandler>,
        context: &mut CommandContext,
    ) -> Result<usize, ModelingError> {
        self.fire_phase(Phase::Execute, command, context)?;
        let dirty = handler.execute(self, context)?;
        self.stack.mark_dirty(dirty);
        let index = self.stack.executed_action(command, context.clone());
        self.fire_phase(Phase::Executed, command, context)?;
        Ok(index)
    }

    fn atomic_revert(
        &mut self,
        command: &str,
        handler: &Rc<dyn CommandHandler>,
        context: &mut CommandContext,
    ) -> Result<(), ModelingError> {
        self.fire_phase(Phase::Revert, command, context)?;
        let dirty = handler.revert(self, context)?;
        self.stack.mark_dirty(dirty);
        self.fire_phase(Phase::Reverted, command, context)
    }

    fn fire_phase(
        &mut self,
        phase: Phase,
        command: &str,
        context: &mut CommandContext,
    ) -> Result<(), ModelingError> {
        for interceptor in self.stack.interceptors(phase.is_revert()) {
            interceptor.intercept(phase, command, self, context)?;
        }
        Ok(())
    }

    /// Nimmt die Aktion an `index` zurück.
    fn revert_action(&mut self, index: usize) -> Result<(), ModelingError> {
        let Some(action) = self.stack.action(index).cloned() else {
            return Ok(());
        };
        let handler = self.stack.handler(&action.command)?;
        let mut context = action.context;

        self.stack.set_atomic(true);
        let result = self.atomic_revert(&action.command, &handler, &mut context);
        self.stack.set_atomic(false);
        result?;

        self.stack.update_context(index, context);
        self.stack.reverted_action();
        Ok(())
    }

    /// Wiederholt die Aktion an `index` (nur execute-Phasen).
    fn redo_action(&mut self, index: usize) -> Result<(), ModelingError> {
        let Some(action) = self.stack.action(index).cloned() else {
            return Ok(());
        };
        let handler = self.stack.handler(&action.command)?;
        let mut context = action.context;

        self.stack.set_atomic(true);
        let result = self.atomic_redo(&action.command, &handler, &mut context);
        self.stack.set_atomic(false);
        result?;

        self.stack.update_context(index, context);
        self.stack.redone_action();
        Ok(())
    }

    fn atomic_redo(
        &mut self,
        command: &str,
        handler: &Rc<dyn CommandHandler>,
        context: &mut CommandContext,
    ) -> Result<(), ModelingError> {
        self.fire_phase(Phase::Execute, command, context)?;
        let dirty = handler.execute(self, context)?;
        self.stack.mark_dirty(dirty);
        self.fire_phase(Phase::Executed, command, context)
    }

    /// Macht die letzte Operation rückgängig. `Ok(false)` wenn nichts zu tun ist.
    pub fn undo(&mut self) -> Result<bool, ModelingError> {
        if !self.stack.is_idle() {
            return Err(ModelingError::IllegalInvocation("undo".into()));
        }
        let Some(mut index) = self.stack.undo_index() else {
            log::debug!("Undo: keine Operation vorhanden");
            return Ok(false);
        };
        let Some(operation) = self.stack.action(index).map(|a| a.id) else {
            return Ok(false);
        };

        self.stack.begin(Trigger::Undo);
        let result = loop {
            if let Err(err) = self.revert_action(index) {
                break Err(err);
            }
            match self.stack.undo_index() {
                Some(next) if self.stack.action(next).map(|a| a.id) == Some(operation) => {
                    index = next;
                }
                _ => break Ok(()),
            }
        };
        self.finish_operation();

        result?;
        log::info!("Undo ausgeführt (Operation {})", operation);
        Ok(true)
    }

    /// Wiederholt die zuletzt rückgängig gemachte Operation.
    pub fn redo(&mut self) -> Result<bool, ModelingError> {
        if !self.stack.is_idle() {
            return Err(ModelingError::IllegalInvocation("redo".into()));
        }
        let Some(mut index) = self.stack.redo_index() else {
            log::debug!("Redo: keine Operation vorhanden");
            return Ok(false);
        };
        let Some(operation) = self.stack.action(index).map(|a| a.id) else {
            return Ok(false);
        };

        self.stack.begin(Trigger::Redo);
        let result = loop {
            if let Err(err) = self.redo_action(index) {
                break Err(err);
            }
            match self.stack.redo_index() {
                Some(next) if self.stack.action(next).map(|a| a.id) == Some(operation) => {
                    index = next;
                }
                _ => break Ok(()),
            }
        };
        self.finish_operation();

        result?;
        log::info!("Redo ausgeführt (Operation {})", operation);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        self.stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.stack.can_redo()
    }

    /// Leert den Undo/Redo-Verlauf.
    pub fn clear_history(&mut self) {
        self.stack.clear();
        self.canvas.fire(
            "commandStack.changed",
            EventPayload::CommandStack {
                trigger: Trigger::Clear,
            },
        );
    }

    /// Nimmt alle Aktionen der laufenden Operation zurück.
    fn rollback_operation(&mut self) {
        self.stack.set_atomic(false);
        for index in self.stack.rollback_indices() {
            if let Err(err) = self.revert_action(index) {
                log::error!("Rollback von Aktion {} fehlgeschlagen: {}", index, err);
            }
        }
        self.stack.discard_operation();
        self.finish_operation();
    }

    /// Schließt eine Operation ab: Neuzeichnen und Change-Events.
    fn finish_operation(&mut self) {
        let (dirty, trigger) = self.stack.finish();
        self.canvas.mark_changed(&dirty);
        self.canvas
            .fire("commandStack.changed", EventPayload::CommandStack { trigger });
    }
}
