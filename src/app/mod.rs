//! Application-Layer: Controller, State, Events und Feature-Handler über
//! einer Modeling-Session.

pub mod command_log;
pub mod controller;
pub mod events;
pub mod handlers;
mod intent_mapping;
/// Application State und Controller
///
/// Dieses Modul verwaltet den Zustand der Anwendung (Session, Selektion, Drag).
pub mod state;

pub use command_log::{CommandLog, LogEntry, UndoStep};
pub use controller::AppController;
pub use events::{AppCommand, AppIntent};
pub use state::{AppState, MoveOperation, SelectionState};
