//! Geteilte Typen für layer-übergreifende Verträge.
//!
//! Enthält die Laufzeit-Optionen, die sowohl der `Modeler` als auch
//! die `app`-Schicht lesen.

pub mod options;

pub use options::ModelingOptions;
pub use options::{MIN_SHAPE_HEIGHT, MIN_SHAPE_WIDTH};
