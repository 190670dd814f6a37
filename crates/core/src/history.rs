//! Snapshot undo/redo for the current page
//!
//! Snapshots are whole [`PageStrokeSet`]s. They are only meaningful for the
//! geometry they were taken under, so the coordinator clears the history
//! whenever the page, rotation or margin placement changes.

use crate::store::PageStrokeSet;

#[derive(Debug, Clone)]
pub struct EditHistory {
    undo: Vec<PageStrokeSet>,
    redo: Vec<PageStrokeSet>,
    max_depth: usize,
}

impl EditHistory {
    pub fn new(max_depth: usize) -> Self {
        Self { undo: Vec::new(), redo: Vec::new(), max_depth }
    }

    /// Record the state before an edit. Clears the redo stack.
    pub fn record(&mut self, before: PageStrokeSet) {
        if self.max_depth == 0 {
            return;
        }
        self.undo.push(before);
        if self.undo.len() > self.max_depth {
            let overflow = self.undo.len() - self.max_depth;
            self.undo.drain(..overflow);
        }
        self.redo.clear();
    }

    /// Step back: returns the state to restore, stashing `current` for redo
    pub fn undo(&mut self, current: PageStrokeSet) -> Option<PageStrokeSet> {
        let previous = self.undo.pop()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Step forward: returns the state to restore, stashing `current` for undo
    pub fn redo(&mut self, current: PageStrokeSet) -> Option<PageStrokeSet> {
        let next = self.redo.pop()?;
        self.undo.push(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
