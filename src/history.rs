//! Bounded, position-addressed undo/redo history.
//!
//! Unlike a two-stack undo system, the buffer stores full snapshots in one
//! sequence and keeps a cursor into it. The entry at the cursor is the state
//! the editor currently shows.

use crate::constants::DEFAULT_HISTORY_CAPACITY;

/// Snapshot history with a fixed capacity.
///
/// # Example
/// ```
/// use figedit::history::HistoryBuffer;
///
/// let mut history: HistoryBuffer<&str> = HistoryBuffer::new(10);
/// history.add("a");
/// history.add("b");
/// assert_eq!(history.undo(), Some("a"));
/// assert_eq!(history.redo(), Some("b"));
/// assert_eq!(history.redo(), None);
/// ```
#[derive(Debug, Clone)]
pub struct HistoryBuffer<T: Clone + PartialEq> {
    entries: Vec<T>,
    /// Index of the current entry; meaningless while `entries` is empty
    position: usize,
    capacity: usize,
}

impl<T: Clone + PartialEq> Default for HistoryBuffer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl<T: Clone + PartialEq> HistoryBuffer<T> {
    /// Create an empty history keeping at most `capacity` snapshots.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            position: 0,
            capacity: capacity.max(1),
        }
    }

    /// Record a snapshot.
    ///
    /// Ignored when equal to the most recently stored entry. Otherwise the
    /// redo branch after the cursor is discarded, the snapshot appended, the
    /// oldest entries dropped beyond capacity, and the cursor moved to it.
    /// Returns whether the snapshot was stored.
    pub fn add(&mut self, snapshot: T) -> bool {
        if self.entries.last() == Some(&snapshot) {
            log::trace!("History: skipped duplicate snapshot");
            return false;
        }

        if !self.entries.is_empty() {
            self.entries.truncate(self.position + 1);
        }
        self.entries.push(snapshot);

        if self.entries.len() > self.capacity {
            let excess = self.entries.len() - self.capacity;
            self.entries.drain(..excess);
        }
        self.position = self.entries.len() - 1;

        log::debug!(
            "History: stored snapshot {} of {}",
            self.position + 1,
            self.entries.len()
        );
        true
    }

    /// Step back one snapshot. Returns `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<T> {
        if !self.can_undo() {
            return None;
        }
        self.position -= 1;
        log::debug!("History: undo to {}", self.position);
        self.entries.get(self.position).cloned()
    }

    /// Step forward one snapshot. Returns `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<T> {
        if !self.can_redo() {
            return None;
        }
        self.position += 1;
        log::debug!("History: redo to {}", self.position);
        self.entries.get(self.position).cloned()
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.position >= 1
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.position + 1 < self.entries.len()
    }

    /// The snapshot at the cursor, if any.
    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.position)
    }

    /// Cursor index into the stored snapshots.
    pub fn position(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.position)
    }

    /// All stored snapshots, oldest first.
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all snapshots.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.position = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_has_nothing_to_undo() {
        let mut history: HistoryBuffer<u32> = HistoryBuffer::default();
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), None);
        assert_eq!(history.position(), None);
        assert_eq!(history.capacity(), DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn test_capacity_keeps_latest_entries() {
        let mut history = HistoryBuffer::new(2);
        history.add('A');
        history.add('B');
        history.add('C');
        assert_eq!(history.entries(), &['B', 'C']);
        assert_eq!(history.current(), Some(&'C'));
        assert_eq!(history.position(), Some(1));
        assert_eq!(history.undo(), Some('B'));
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn test_add_discards_redo_branch() {
        let mut history = HistoryBuffer::new(10);
        history.add('A');
        history.add('B');
        assert_eq!(history.undo(), Some('A'));
        history.add('D');
        assert_eq!(history.entries(), &['A', 'D']);
        assert!(!history.entries().contains(&'B'));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_duplicate_of_last_entry_ignored() {
        let mut history = HistoryBuffer::new(10);
        assert!(history.add(1));
        assert!(!history.add(1));
        assert_eq!(history.len(), 1);
        assert!(history.add(2));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_undo_redo_walk() {
        let mut history = HistoryBuffer::new(5);
        for i in 0..4 {
            history.add(i);
        }
        assert_eq!(history.undo(), Some(2));
        assert_eq!(history.undo(), Some(1));
        assert_eq!(history.redo(), Some(2));
        assert_eq!(history.redo(), Some(3));
        assert_eq!(history.redo(), None);
        assert_eq!(history.current(), Some(&3));
    }

    #[test]
    fn test_clear() {
        let mut history = HistoryBuffer::new(3);
        history.add(1);
        history.add(2);
        history.clear();
        assert!(history.is_empty());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
