//! Undo/redo history behaviour

use laneflow::prelude::*;
use laneflow::HISTORY_CAPACITY;

fn state(n: usize) -> LayoutState {
    LayoutState::new(
        vec![Node::new("node", NodeKind::Task, format!("v{}", n))],
        Vec::new(),
    )
}

#[test]
fn test_round_trip() {
    let mut history = History::new();
    history.snapshot(&state(0));
    history.snapshot(&state(1));

    assert_eq!(history.undo(), Some(state(0)));
    assert_eq!(history.redo(), Some(state(1)));
}

#[test]
fn test_snapshot_after_undo_discards_future() {
    let mut history = History::new();
    history.snapshot(&state(0));
    history.snapshot(&state(1));
    history.undo();
    assert!(history.can_redo());

    history.snapshot(&state(2));
    assert!(!history.can_redo());
    assert_eq!(history.redo(), None);
    assert_eq!(history.undo(), Some(state(0)));
}

#[test]
fn test_capacity_evicts_oldest_first() {
    let mut history = History::new();
    for n in 0..60 {
        history.snapshot(&state(n));
    }
    assert_eq!(history.past_len(), HISTORY_CAPACITY);

    let mut undone = Vec::new();
    while let Some(s) = history.undo() {
        undone.push(s);
    }
    assert_eq!(undone.len(), 50);
    // 0..=8 were evicted; 9 is the oldest survivor
    assert_eq!(undone.last(), Some(&state(9)));
    assert_eq!(undone.first(), Some(&state(58)));
}

#[test]
fn test_snapshots_are_independent_of_live_state() {
    let mut history = History::new();
    let mut live = state(0);
    history.snapshot(&live);
    live.nodes[0].label = "mutated".to_string();
    live.nodes[0].position = Point::new(999.0, 999.0);
    history.snapshot(&live);

    let restored = history.undo().unwrap();
    assert_eq!(restored, state(0));
    assert_eq!(restored.nodes[0].position, Point::default());
}

#[test]
fn test_returned_state_does_not_alias_history() {
    let mut history = History::new();
    history.snapshot(&state(0));
    history.snapshot(&state(1));

    let mut restored = history.undo().unwrap();
    restored.nodes.clear();
    assert_eq!(history.current(), Some(&state(0)));
}

#[test]
fn test_reset_starts_fresh_baseline() {
    let mut history = History::new();
    for n in 0..5 {
        history.snapshot(&state(n));
    }
    history.reset(&state(100));
    assert_eq!(history.past_len(), 0);
    assert_eq!(history.future_len(), 0);
    assert_eq!(history.undo(), None);

    history.snapshot(&state(101));
    assert_eq!(history.undo(), Some(state(100)));
}
