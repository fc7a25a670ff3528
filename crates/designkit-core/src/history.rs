//! Bounded undo/redo history over snapshots of the object collection.

use crate::object::CanvasObject;
use std::collections::VecDeque;

/// Maximum number of entries kept on each history stack.
pub const MAX_HISTORY_DEPTH: usize = 10;

/// A full copy of the object collection at a point in time.
pub type Snapshot = Vec<CanvasObject>;

/// Linear undo/redo log.
///
/// The undo stack is pushed before every mutation; the oldest entry is
/// evicted once the stack exceeds its capacity. Any new snapshot discards
/// the redo stack.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: VecDeque<Snapshot>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Create a history with the default depth.
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY_DEPTH)
    }

    /// Create a history holding at most `capacity` entries per stack.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            undo_stack: VecDeque::with_capacity(capacity + 1),
            redo_stack: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Push a copy of the collection (call before making changes).
    pub fn snapshot(&mut self, collection: &[CanvasObject]) {
        push_bounded(&mut self.undo_stack, collection.to_vec(), self.capacity);
        self.redo_stack.clear();
    }

    /// Step back one entry.
    /// Returns the collection to restore, or None if there is nothing to undo.
    pub fn undo(&mut self, current: &[CanvasObject]) -> Option<Snapshot> {
        let previous = self.undo_stack.pop_back()?;
        push_bounded(&mut self.redo_stack, current.to_vec(), self.capacity);
        Some(previous)
    }

    /// Step forward one entry.
    /// Returns the collection to restore, or None if there is nothing to redo.
    pub fn redo(&mut self, current: &[CanvasObject]) -> Option<Snapshot> {
        let next = self.redo_stack.pop_back()?;
        push_bounded(&mut self.undo_stack, current.to_vec(), self.capacity);
        Some(next)
    }

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

fn push_bounded(stack: &mut VecDeque<Snapshot>, snapshot: Snapshot, capacity: usize) {
    stack.push_back(snapshot);
    while stack.len() > capacity {
        stack.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ShapeKind;

    fn rect(id: &str) -> CanvasObject {
        CanvasObject::shape(id, ShapeKind::Rectangle, 0.0, 0.0)
    }

    #[test]
    fn test_undo_redo_roundtrip() {
        let mut history = History::new();
        let before = vec![rect("a")];
        let after = vec![rect("a"), rect("b")];

        history.snapshot(&before);
        let restored = history.undo(&after).unwrap();
        assert_eq!(restored, before);
        assert!(history.can_redo());

        let redone = history.redo(&restored).unwrap();
        assert_eq!(redone, after);
        assert!(history.can_undo());
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut history = History::new();
        assert!(history.undo(&[]).is_none());
        assert!(history.redo(&[]).is_none());
        assert_eq!(history.undo_depth(), 0);
        assert_eq!(history.redo_depth(), 0);
    }

    #[test]
    fn test_bounded_eviction_drops_oldest() {
        let mut history = History::new();
        for i in 0..15 {
            history.snapshot(&[rect(&i.to_string())]);
        }
        assert_eq!(history.undo_depth(), MAX_HISTORY_DEPTH);

        let mut last = None;
        while let Some(snapshot) = history.undo(&[]) {
            last = Some(snapshot);
        }
        // Entries 0..5 were evicted
        assert_eq!(last.unwrap()[0].id, "5");
    }

    #[test]
    fn test_snapshot_clears_redo() {
        let mut history = History::new();
        history.snapshot(&[]);
        history.undo(&[rect("a")]);
        assert!(history.can_redo());

        history.snapshot(&[]);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_redo_stack_is_bounded() {
        let mut history = History::with_capacity(3);
        for _ in 0..3 {
            history.snapshot(&[]);
        }
        // Redo pushes onto undo; undo pushes onto redo; both stay within capacity.
        while history.undo(&[]).is_some() {}
        assert_eq!(history.redo_depth(), 3);
        history.redo(&[]);
        assert_eq!(history.undo_depth(), 1);
    }
}
