//! Diagram Modeler Library.
//! Transaktionaler Editier-Kern für Diagramme, als Library exportiert für
//! Tests, Benchmarks und den Szenario-Runner.

pub mod app;
pub mod command;
pub mod copy_paste;
pub mod core;
pub mod error;
pub mod modeling;
pub mod rules;
pub mod shared;

pub use app::{AppCommand, AppController, AppIntent, AppState, MoveOperation, SelectionState};
pub use command::{CommandContext, CommandHandler, CommandInterceptor, CommandStack, Phase};
pub use copy_paste::{Clipboard, CopyTree, Descriptor, DescriptorBuilder, PasteOutcome, ReferenceDescriptor};
pub use core::{Bounds, Canvas, DiagramSnapshot, Element, ElementId, ElementKind, Waypoint};
pub use error::ModelingError;
pub use modeling::{BaseLayouter, Layouter, Modeler};
pub use rules::{Allowed, RuleContext, RuleProvider, Rules};
pub use shared::ModelingOptions;
