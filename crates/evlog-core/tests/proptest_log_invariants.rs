#![forbid(unsafe_code)]

//! Property tests for [`EventLog`] invariants.
//!
//! Validates, over random commit/undo/redo/clear sequences:
//! - `undoable()` is false iff the cursor is at start.
//! - `redoable()` is false iff the cursor is on the last node.
//! - The tree's event count matches a flat reference model.
//! - Runs never nest and every child shares its head's kind.
//! - A run of N same-kind commits forms one head with N-1 children.

use proptest::prelude::*;

use evlog_core::{Event, EventId, EventLog, EventLogConfig, Position, UndoObserver};

// ============================================================================
// Strategy helpers
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Commit(u8),
    Undo,
    Redo,
    ClearUndo,
    ClearRedo,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        5 => (0u8..3).prop_map(Op::Commit),
        3 => Just(Op::Undo),
        2 => Just(Op::Redo),
        1 => Just(Op::ClearUndo),
        1 => Just(Op::ClearRedo),
    ]
}

fn ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), 1..=max_len)
}

const KINDS: [&str; 3] = ["move", "fill", "delete"];

/// Flat undo stack the log should mirror.
#[derive(Default)]
struct Model {
    events: Vec<Event>,
    applied: usize,
    next_id: u64,
}

impl Model {
    fn apply(&mut self, op: &Op, log: &mut EventLog) {
        match op {
            Op::Commit(kind) => {
                let event = Event::new(
                    EventId::new(self.next_id),
                    KINDS[usize::from(*kind)],
                    format!("event {}", self.next_id),
                );
                self.next_id += 1;
                self.events.truncate(self.applied);
                self.events.push(event.clone());
                self.applied += 1;
                log.notify_undo_commit_event(&event);
            }
            Op::Undo => {
                if self.applied > 0 {
                    self.applied -= 1;
                    log.notify_undo_event(&self.events[self.applied]);
                }
            }
            Op::Redo => {
                if self.applied < self.events.len() {
                    log.notify_redo_event(&self.events[self.applied]);
                    self.applied += 1;
                }
            }
            Op::ClearUndo => {
                self.events.drain(..self.applied);
                self.applied = 0;
                log.notify_clear_undo_event();
            }
            Op::ClearRedo => {
                self.events.truncate(self.applied);
                log.notify_clear_redo_event();
            }
        }
    }
}

fn run(ops: &[Op]) -> (Model, EventLog) {
    let mut model = Model::default();
    let mut log = EventLog::new(EventLogConfig::default());
    for op in ops {
        model.apply(op, &mut log);
    }
    (model, log)
}

// ============================================================================
// Invariant 1: cursor flags mirror the flat model
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn undoable_and_redoable_track_cursor(ops in ops_strategy(60)) {
        let mut model = Model::default();
        let mut log = EventLog::default();
        for op in &ops {
            model.apply(op, &mut log);

            prop_assert_eq!(log.undoable(), !log.current().is_start());
            prop_assert_eq!(log.undoable(), model.applied > 0);
            prop_assert_eq!(log.redoable(), log.current() != log.tree().last_position());
            prop_assert_eq!(log.redoable(), model.applied < model.events.len());
            prop_assert_eq!(log.tree().ordinal(log.current()), model.applied);
        }
    }
}

// ============================================================================
// Invariant 2: the tree holds exactly the model's events, in order
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn tree_sequence_matches_model(ops in ops_strategy(60)) {
        let (model, log) = run(&ops);
        let ids: Vec<EventId> = log.tree().iter().map(|e| e.log_node.event().id()).collect();
        let expected: Vec<EventId> = model.events.iter().map(Event::id).collect();
        prop_assert_eq!(ids, expected);
        prop_assert_eq!(log.tree().len(), model.events.len());
    }
}

// ============================================================================
// Invariant 3: one level of nesting, children share their head's kind
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn runs_are_flat_and_homogeneous(ops in ops_strategy(60)) {
        let (_, log) = run(&ops);
        for head in log.tree().groups() {
            for child in head.children() {
                prop_assert!(!child.has_children());
                prop_assert_eq!(child.event().kind(), head.event().kind());
            }
        }
    }
}

// ============================================================================
// Invariant 4: N same-kind commits form one run of N
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn same_kind_commits_form_one_run(n in 1usize..40) {
        let ops: Vec<Op> = (0..n).map(|_| Op::Commit(0)).collect();
        let (_, log) = run(&ops);
        prop_assert_eq!(log.tree().group_count(), 1);
        prop_assert_eq!(log.tree().groups()[0].child_count(), n - 1);
        prop_assert_eq!(log.current_parent().is_some(), n > 1);
    }
}

// ============================================================================
// Invariant 5: clears leave the matching side empty
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn clears_empty_their_side(ops in ops_strategy(40)) {
        let (_, mut log) = run(&ops);
        let redoable = log.redoable();
        log.notify_clear_undo_event();
        prop_assert!(!log.undoable());
        prop_assert_eq!(log.current(), Position::Start);
        prop_assert_eq!(log.redoable(), redoable);

        log.notify_clear_redo_event();
        prop_assert!(!log.redoable());
        prop_assert!(log.tree().is_empty());
    }
}

// ============================================================================
// Invariant 6: undoing everything walks back to start
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn full_undo_reaches_start_and_full_redo_returns(ops in ops_strategy(40)) {
        let (mut model, mut log) = run(&ops);
        let end = log.current();
        let applied = model.applied;
        for _ in 0..applied {
            model.apply(&Op::Undo, &mut log);
        }
        prop_assert!(log.is_pristine());
        for _ in 0..applied {
            model.apply(&Op::Redo, &mut log);
        }
        prop_assert_eq!(log.current(), end);
    }
}
