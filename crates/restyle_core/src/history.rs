//! Undo/redo history over override map snapshots
//!
//! The top of the undo stack is always the current state. Undo moves the top
//! onto the redo stack and hands back the snapshot underneath it; redo moves
//! it back. A fresh commit invalidates the redo stack.
//!
//! Tracking can be suppressed while the editor replays snapshots or bulk
//! loads values, so those replays never create history entries of their own.

use crate::value::OverrideMap;
use std::collections::VecDeque;

/// Number of snapshots kept before the oldest is evicted
pub const DEFAULT_UNDO_CAPACITY: usize = 10;

/// Bounded undo/redo sequence of override map snapshots
#[derive(Clone, Debug)]
pub struct HistoryStack {
    undo: VecDeque<OverrideMap>,
    redo: Vec<OverrideMap>,
    capacity: usize,
    suppressed: bool,
}

impl HistoryStack {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            undo: VecDeque::with_capacity(capacity),
            redo: Vec::new(),
            capacity,
            suppressed: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Suppress or resume tracking. While suppressed, commits are ignored.
    pub fn set_suppressed(&mut self, suppressed: bool) {
        self.suppressed = suppressed;
    }

    /// Record a snapshot as the new current state.
    ///
    /// Returns `false` without touching either stack while tracking is
    /// suppressed.
    pub fn commit(&mut self, snapshot: &OverrideMap) -> bool {
        if self.suppressed {
            return false;
        }
        self.redo.clear();
        if self.undo.len() >= self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(snapshot.clone());
        tracing::trace!("HistoryStack: commit ({} entries)", self.undo.len());
        true
    }

    /// There is a state before the current one
    pub fn can_undo(&self) -> bool {
        self.undo.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Discard the current state and return the one to restore
    pub fn step_back(&mut self) -> Option<OverrideMap> {
        if !self.can_undo() {
            return None;
        }
        let current = self.undo.pop_back()?;
        self.redo.push(current);
        self.undo.back().cloned()
    }

    /// Re-apply the most recently undone state and return it
    pub fn step_forward(&mut self) -> Option<OverrideMap> {
        let next = self.redo.pop()?;
        if self.undo.len() >= self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(next.clone());
        Some(next)
    }

    /// Snapshot considered current, if anything has been committed
    pub fn current(&self) -> Option<&OverrideMap> {
        self.undo.back()
    }

    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_CAPACITY)
    }
}
