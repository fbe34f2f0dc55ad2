//! Copy/Paste: Kopier-Baum, Deskriptor-Pipeline, Zwischenablage und Einfügen.

pub mod clipboard;
pub mod descriptor;
mod paste;
pub mod tree;

pub use clipboard::Clipboard;
pub use descriptor::{
    CopyDelta, Descriptor, DescriptorBuilder, DescriptorGeometry, ReferenceDescriptor,
    PRIORITY_ATTACHER, PRIORITY_CONNECTION, PRIORITY_LABEL, PRIORITY_SHAPE,
};
pub use paste::PasteOutcome;
pub use tree::{create_tree, get_top_level, CopyTree};
