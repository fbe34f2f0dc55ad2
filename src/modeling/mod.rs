//! Modeling-Session: Canvas, Command-Stack und Kollaboratoren hinter einer Fassade.
//!
//! Ein `Modeler` ist eine in sich geschlossene Diagramm-Session. Mehrere
//! Sessions können unabhängig voneinander im selben Prozess leben.

pub mod behavior;
mod facade;
pub mod handlers;
pub mod layout;
pub mod move_closure;
mod move_helper;


pub use layout::{BaseLayouter, Layouter};
pub use move_closure::{get_closure, Closure};

use crate::command::CommandStack;
use crate::copy_paste::{Clipboard, DescriptorBuilder};
use crate::core::{Canvas, Element, ElementFactory, ElementId, GraphicsFactory};
use crate::error::ModelingError;
use crate::rules::{Allowed, RuleContext, RuleProvider, Rules};
use crate::shared::ModelingOptions;
use std::rc::Rc;

/// Eine Diagramm-Session mit allen Kollaboratoren.
pub struct Modeler {
    pub(crate) canvas: Canvas,
    pub(crate) stack: CommandStack,
    pub(crate) rules: Box<dyn Rules>,
    pub(crate) layouter: Box<dyn Layouter>,
    pub(crate) factory: ElementFactory,
    pub(crate) options: ModelingOptions,
    pub(crate) clipboard: Clipboard,
    pub(crate) descriptor_builders: Vec<Rc<dyn DescriptorBuilder>>,
}

impl std::fmt::Debug for Modeler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Modeler")
            .field("canvas", &self.canvas)
            .field("stack", &self.stack)
            .field("options", &self.options)
            .finish()
    }
}

impl Default for Modeler {
    fn default() -> Self {
        Self::new(ModelingOptions::default())
    }
}

impl Modeler {
    /// Erstellt eine Session mit Standard-Handlern und -Behaviors.
    ///
    /// Ohne eigene Regeln ist alles erlaubt (`DontCare`).
    pub fn new(options: ModelingOptions) -> Self {
        let mut modeler = Self {
            canvas: Canvas::headless(),
            stack: CommandStack::new(options.max_undo_depth),
            rules: Box::new(RuleProvider::new()),
            layouter: Box::new(BaseLayouter),
            factory: ElementFactory::new(),
            options,
            clipboard: Clipboard::default(),
            descriptor_builders: Vec::new(),
        };
        handlers::register_default_handlers(&mut modeler.stack);
        behavior::register_default_behaviors(&mut modeler.stack);
        modeler
    }

    /// Ersetzt den Regel-Provider.
    pub fn with_rules(mut self, rules: impl Rules + 'static) -> Self {
        self.rules = Box::new(rules);
        self
    }

    /// Ersetzt den Layouter.
    pub fn with_layouter(mut self, layouter: impl Layouter + 'static) -> Self {
        self.layouter = Box::new(layouter);
        self
    }

    /// Ersetzt die Grafik-Factory (nur vor dem ersten Element sinnvoll).
    pub fn with_graphics(mut self, graphics: Box<dyn GraphicsFactory>) -> Self {
        if !self.canvas.registry().is_empty() {
            log::warn!("Grafik-Factory ersetzt, bestehende Elemente gehen verloren");
        }
        self.canvas = Canvas::new(graphics);
        self
    }

    /// Ersetzt den Regel-Provider einer laufenden Session.
    pub fn set_rules(&mut self, rules: impl Rules + 'static) {
        self.rules = Box::new(rules);
    }

    // ── Zugriff ────────────────────────────────────────────────────

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Veränderlicher Canvas-Zugriff (Root-Ebenen, Event-Listener, `update_id`).
    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn command_stack(&self) -> &CommandStack {
        &self.stack
    }

    /// Zum Registrieren eigener Handler und Interceptors.
    pub fn command_stack_mut(&mut self) -> &mut CommandStack {
        &mut self.stack
    }

    pub fn options(&self) -> &ModelingOptions {
        &self.options
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn factory_mut(&mut self) -> &mut ElementFactory {
        &mut self.factory
    }

    /// Element zu einer ID.
    pub fn element(&self, id: &str) -> Result<&Element, ModelingError> {
        self.canvas.element(id)
    }

    /// Aktives Root (legt bei Bedarf ein implizites an).
    pub fn root(&mut self) -> Result<ElementId, ModelingError> {
        self.canvas
            .get_root_element()
            .ok_or(ModelingError::NoActiveRoot)
    }

    /// Fragt den Regel-Provider.
    pub fn allowed(&self, action: &str, context: &RuleContext<'_>) -> Allowed {
        self.rules.allowed(action, context, &self.canvas)
    }

    /// Registriert einen zusätzlichen Deskriptor-Baustein für Copy/Paste.
    pub fn register_descriptor(&mut self, builder: impl DescriptorBuilder + 'static) {
        self.descriptor_builders.push(Rc::new(builder));
    }

    /// Neue, in der Registry noch freie ID.
    pub(crate) fn unique_id(&mut self, prefix: &str) -> ElementId {
        loop {
            let id = self.factory.next_id(prefix);
            if !self.canvas.registry().contains(&id) {
                return id;
            }
        }
    }
}
