//! # Undo/Redo Stack
//!
//! Linear history of immutable snapshots with a cursor.
//!
//! ## Design
//!
//! - Every committed action pushes the snapshot it produced
//! - Pushing discards any redo entries beyond the cursor
//! - Undo and redo only move the cursor; nothing is recomputed
//! - Snapshots share structure by reference count, so retaining many is cheap
//! - Ephemeral UI state (drag session, command menu) never enters the stack
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new(initial);
//! stack.push(next);
//!
//! assert!(stack.undo());
//! assert!(stack.current().same_as(&initial));
//! assert!(stack.redo());
//! ```

use folio_document::Snapshot;

/// Undo/redo stack for document editing
#[derive(Debug, Clone)]
pub struct UndoStack {
    /// Snapshots, oldest first
    entries: Vec<Snapshot>,

    /// Index of the current snapshot
    index: usize,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new(initial: Snapshot) -> Self {
        Self::with_max_levels(initial, 100)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(initial: Snapshot, max_levels: usize) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
            max_levels,
        }
    }

    /// The snapshot at the cursor
    pub fn current(&self) -> &Snapshot {
        &self.entries[self.index]
    }

    /// Append a snapshot after the cursor, discarding redo entries
    pub fn push(&mut self, snapshot: Snapshot) {
        self.entries.truncate(self.index + 1);
        self.entries.push(snapshot);
        self.index = self.entries.len() - 1;

        // Trim if exceeded max levels
        if self.max_levels > 0 && self.entries.len() > self.max_levels + 1 {
            let excess = self.entries.len() - (self.max_levels + 1);
            self.entries.drain(..excess);
            self.index -= excess;
        }
    }

    /// Step back one snapshot
    pub fn undo(&mut self) -> bool {
        if self.index == 0 {
            return false; // Nothing to undo
        }
        self.index -= 1;
        true
    }

    /// Step forward one snapshot
    pub fn redo(&mut self) -> bool {
        if self.index + 1 >= self.entries.len() {
            return false; // Nothing to redo
        }
        self.index += 1;
        true
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.index
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.entries.len() - 1 - self.index
    }

    /// Forget all history, keeping the current snapshot
    pub fn clear(&mut self) {
        let current = self.current().clone();
        self.entries = vec![current];
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_document::{ContainerNode, TextNode};

    fn snapshot(text: &str) -> Snapshot {
        Snapshot::new(ContainerNode::new("root").with_children(vec![TextNode::paragraph("p", text).into()]))
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new(snapshot("a"));
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_push_undo_redo() {
        let first = snapshot("a");
        let second = snapshot("b");
        let mut stack = UndoStack::new(first.clone());

        stack.push(second.clone());
        assert_eq!(stack.undo_levels(), 1);
        assert!(stack.can_undo());

        // Undo
        assert!(stack.undo());
        assert!(stack.current().same_as(&first));
        assert_eq!(stack.redo_levels(), 1);
        assert!(!stack.undo());

        // Redo
        assert!(stack.redo());
        assert!(stack.current().same_as(&second));
        assert!(!stack.redo());
    }

    #[test]
    fn test_new_push_clears_redo() {
        let mut stack = UndoStack::new(snapshot("a"));
        stack.push(snapshot("b"));
        stack.undo();
        assert_eq!(stack.redo_levels(), 1);

        stack.push(snapshot("c"));
        assert_eq!(stack.redo_levels(), 0);
        assert_eq!(stack.undo_levels(), 1);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut stack = UndoStack::with_max_levels(snapshot("start"), 2);

        for i in 0..3 {
            stack.push(snapshot(&format!("Text {}", i)));
        }

        // Should only keep 2 (max levels)
        assert_eq!(stack.undo_levels(), 2);
        assert_eq!(stack.current(), &snapshot("Text 2"));
    }

    #[test]
    fn test_unlimited_levels() {
        let mut stack = UndoStack::with_max_levels(snapshot("start"), 0);
        for i in 0..150 {
            stack.push(snapshot(&i.to_string()));
        }
        assert_eq!(stack.undo_levels(), 150);

        stack.clear();
        assert!(!stack.can_undo());
        assert_eq!(stack.current(), &snapshot("149"));
    }
}
