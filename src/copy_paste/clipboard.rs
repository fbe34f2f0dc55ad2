//! Zwischenablage einer Session (hält den zuletzt kopierten Baum).

use super::tree::CopyTree;

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    tree: Option<CopyTree>,
}

impl Clipboard {
    pub fn get(&self) -> Option<&CopyTree> {
        self.tree.as_ref()
    }

    pub fn set(&mut self, tree: CopyTree) {
        self.tree = Some(tree);
    }

    pub fn clear(&mut self) {
        self.tree = None;
    }

    /// Leer, wenn nichts oder ein leerer Baum kopiert wurde.
    pub fn is_empty(&self) -> bool {
        self.tree.as_ref().map_or(true, CopyTree::is_empty)
    }
}
