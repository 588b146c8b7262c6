//! Edit history
//!
//! Linear undo/redo over whole [`LayoutState`] snapshots. Snapshots are
//! owned clones, so later edits to the live state never reach them.

use std::collections::VecDeque;
use tracing::trace;

use crate::core::LayoutState;

/// Maximum number of past snapshots kept
pub const HISTORY_CAPACITY: usize = 50;

/// Bounded past/future stacks around a current snapshot
#[derive(Debug, Clone)]
pub struct History {
    /// Oldest first
    past: VecDeque<LayoutState>,
    /// Next redo first
    future: VecDeque<LayoutState>,
    current: Option<LayoutState>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            current: None,
            capacity,
        }
    }

    /// Record `state` as current. The previous current moves onto the past
    /// stack and the redo branch is discarded.
    pub fn snapshot(&mut self, state: &LayoutState) {
        if let Some(previous) = self.current.take() {
            self.past.push_back(previous);
            if self.past.len() > self.capacity {
                self.past.pop_front();
                trace!("History full, evicted oldest snapshot");
            }
            self.future.clear();
        }
        self.current = Some(state.clone());
        trace!(past = self.past.len(), "Snapshot recorded");
    }

    /// Step back one snapshot; `None` when there is nothing to undo
    pub fn undo(&mut self) -> Option<LayoutState> {
        let previous = self.past.pop_back()?;
        if let Some(current) = self.current.take() {
            self.future.push_front(current);
        }
        self.current = Some(previous.clone());
        trace!(past = self.past.len(), future = self.future.len(), "Undo");
        Some(previous)
    }

    /// Step forward one snapshot; `None` when there is nothing to redo
    pub fn redo(&mut self) -> Option<LayoutState> {
        let next = self.future.pop_front()?;
        if let Some(current) = self.current.take() {
            self.past.push_back(current);
        }
        self.current = Some(next.clone());
        trace!(past = self.past.len(), future = self.future.len(), "Redo");
        Some(next)
    }

    /// Start a fresh timeline at `state`
    pub fn reset(&mut self, state: &LayoutState) {
        self.past.clear();
        self.future.clear();
        self.current = Some(state.clone());
        trace!("History reset");
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn current(&self) -> Option<&LayoutState> {
        self.current.as_ref()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Node, NodeKind};

    fn state(label: &str) -> LayoutState {
        LayoutState::new(vec![Node::new("n", NodeKind::Task, label)], Vec::new())
    }

    #[test]
    fn test_first_snapshot_has_no_past() {
        let mut history = History::new();
        history.snapshot(&state("a"));
        assert!(!history.can_undo());
        assert_eq!(history.current(), Some(&state("a")));
    }

    #[test]
    fn test_underflow_is_noop() {
        let mut history = History::new();
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), None);
        history.snapshot(&state("a"));
        assert_eq!(history.undo(), None);
        assert_eq!(history.current(), Some(&state("a")));
    }

    #[test]
    fn test_reset_clears_both_stacks() {
        let mut history = History::new();
        history.snapshot(&state("a"));
        history.snapshot(&state("b"));
        history.snapshot(&state("c"));
        history.undo();
        history.reset(&state("z"));
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.current(), Some(&state("z")));
    }

    #[test]
    fn test_small_capacity_evicts_oldest() {
        let mut history = History::with_capacity(2);
        for label in ["a", "b", "c", "d"] {
            history.snapshot(&state(label));
        }
        assert_eq!(history.past_len(), 2);
        assert_eq!(history.undo(), Some(state("c")));
        assert_eq!(history.undo(), Some(state("b")));
        assert_eq!(history.undo(), None);
    }
}
