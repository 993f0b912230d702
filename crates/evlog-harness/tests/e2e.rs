#![forbid(unsafe_code)]

//! End-to-end scenarios: document, log, view and controller together.

use std::panic::{AssertUnwindSafe, catch_unwind};

use evlog_core::{EventLogConfig, NodeRef, Position};
use evlog_harness::{Fault, Session, SessionError, ViewCall, ViewOp};

fn descriptions(session: &Session) -> Vec<String> {
    session.rows().into_iter().map(|row| row.description).collect()
}

fn rebuilds(session: &Session) -> usize {
    session
        .calls()
        .calls()
        .iter()
        .filter(|call| matches!(call, ViewCall::Rebuild(_)))
        .count()
}

#[test]
fn same_kind_commits_share_a_run() {
    let session = Session::default();
    for _ in 0..3 {
        session.commit("move", "Move");
    }
    session.commit("fill", "Fill");

    let rows = session.rows();
    assert_eq!(rows.len(), 4);
    assert_eq!(
        rows.iter().map(|row| row.depth).collect::<Vec<_>>(),
        vec![0, 1, 1, 0]
    );
    assert_eq!(rows[0].child_count, 2);
    assert_eq!(session.current(), Position::At(NodeRef::head(1)));

    // The run was collapsed when the cursor left it.
    let labels: Vec<String> = session
        .tree()
        .visible_rows()
        .into_iter()
        .map(|row| row.label)
        .collect();
    assert_eq!(labels, vec!["[Unchanged]", "Move", "Fill"]);
    assert!(!session.tree().is_expanded(0));
    assert_eq!(session.violations(), 0);
}

#[test]
fn undo_into_a_run_expands_it() {
    let session = Session::default();
    for _ in 0..3 {
        session.commit("move", "Move");
    }
    session.commit("fill", "Fill");
    assert!(session.undo());

    assert_eq!(session.current(), Position::At(NodeRef::child(0, 1)));
    assert!(session.tree().is_expanded(0));
    assert_eq!(
        session.tree().selected(),
        Some(Position::At(NodeRef::child(0, 1)))
    );
    let (undo, redo) = session.verbs();
    assert_eq!(undo.label, "Undo: Move");
    assert_eq!(redo.label, "Redo: Fill");
    assert!(session.document_matches_log());
}

#[test]
fn ungrouped_config_keeps_runs_flat() {
    let mut config = EventLogConfig::default();
    config.grouping.enabled = false;
    let session = Session::new(config);
    session.commit("move", "Move");
    session.commit("move", "Move");
    assert!(session.rows().iter().all(|row| row.depth == 0));
    assert_eq!(session.tree().visible_len(), 3);
}

#[test]
fn commit_after_undo_discards_redo_events() {
    let session = Session::default();
    session.commit("a", "A");
    session.commit("b", "B");
    session.commit("c", "C");
    session.undo();
    session.undo();
    session.commit("d", "D");

    assert_eq!(descriptions(&session), vec!["A", "D"]);
    assert!(!session.verbs().1.enabled);
    assert!(session.document_matches_log());
}

#[test]
fn commit_after_undo_inside_run_regrows_it() {
    let session = Session::default();
    for _ in 0..3 {
        session.commit("move", "Move");
    }
    session.undo();
    session.undo();
    assert_eq!(session.current(), Position::At(NodeRef::head(0)));

    session.commit("move", "Move again");
    let rows = session.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].child_count, 1);
    assert_eq!(rows[1].description, "Move again");
    assert_eq!(session.current(), Position::At(NodeRef::child(0, 0)));
}

#[test]
fn clear_undo_keeps_redo_side() {
    let session = Session::default();
    session.commit("a", "A");
    session.commit("b", "B");
    session.commit("c", "C");
    session.undo();
    session.clear_undo();

    assert_eq!(descriptions(&session), vec!["C"]);
    assert_eq!(session.current(), Position::Start);
    assert!(!session.verbs().0.enabled);
    assert_eq!(session.verbs().1.label, "Redo: C");
    assert!(session.document_matches_log());

    assert!(session.redo());
    assert_eq!(session.current(), Position::At(NodeRef::head(0)));
}

#[test]
fn clear_redo_keeps_undo_side() {
    let session = Session::default();
    session.commit("a", "A");
    session.commit("b", "B");
    session.commit("c", "C");
    session.undo();
    session.undo();
    session.clear_redo();

    assert_eq!(descriptions(&session), vec!["A"]);
    assert_eq!(session.current(), Position::At(NodeRef::head(0)));
    assert!(!session.verbs().1.enabled);
}

#[test]
fn clicking_rows_walks_the_document() {
    let session = Session::default();
    for name in ["A", "B", "C", "D"] {
        session.commit(name.to_lowercase(), name);
    }

    session.click(2).unwrap();
    assert_eq!(session.current(), Position::At(NodeRef::head(1)));
    assert_eq!(session.document().borrow().applied().len(), 2);
    assert_eq!(
        session.tree().selected(),
        Some(Position::At(NodeRef::head(1)))
    );

    session.click(4).unwrap();
    assert_eq!(session.current(), Position::At(NodeRef::head(3)));
    assert!(session.document_matches_log());
    assert_eq!(session.handler_runs(), 2);
    assert_eq!(session.violations(), 0);
}

#[test]
fn walk_signals_are_all_programmatic() {
    let session = Session::default();
    for _ in 0..3 {
        session.commit("move", "Move");
    }
    session.calls().clear();
    session.click(0).unwrap();

    let signals = session.calls().signals();
    // The click itself, then only echoes of the walk.
    assert!(!signals[0].1);
    assert!(signals[1..].iter().all(|(_, programmatic)| *programmatic));
    assert_eq!(session.handler_runs(), 1);
}

#[test]
fn collapsing_run_at_its_head_steps_to_its_end() {
    let session = Session::default();
    for _ in 0..3 {
        session.commit("move", "Move");
    }
    session.commit("fill", "Fill");

    session.click(1).unwrap();
    assert_eq!(session.current(), Position::At(NodeRef::head(0)));
    assert!(session.tree().is_expanded(0));

    assert!(session.collapse(1).unwrap());
    assert_eq!(session.current(), Position::At(NodeRef::child(0, 1)));
    assert!(session.document_matches_log());
    assert!(!session.log().borrow().notifications_blocked());
    let (undo, redo) = session.verbs();
    assert_eq!(undo.label, "Undo: Move");
    assert_eq!(redo.label, "Redo: Fill");
    assert_eq!(session.violations(), 0);
}

#[test]
fn collapsing_run_with_cursor_on_a_child_ends_at_run_end() {
    let session = Session::default();
    for _ in 0..3 {
        session.commit("move", "Move");
    }
    assert!(session.tree().is_expanded(0));

    session.collapse(1).unwrap();
    assert_eq!(session.current(), Position::At(NodeRef::child(0, 1)));
    assert!(session.document_matches_log());
    assert_eq!(session.violations(), 0);
}

#[test]
fn collapsing_elsewhere_leaves_the_document_alone() {
    let session = Session::default();
    session.commit("move", "Move");
    session.commit("move", "Move");
    session.commit("fill", "Fill");
    session.expand(1).unwrap();

    assert!(session.collapse(1).unwrap());
    assert_eq!(session.current(), Position::At(NodeRef::head(1)));
    assert_eq!(session.document().borrow().applied().len(), 3);
}

#[test]
fn expanding_run_with_cursor_reselects_current() {
    let session = Session::default();
    for _ in 0..3 {
        session.commit("move", "Move");
    }
    session.commit("fill", "Fill");

    session.sync().pause();
    session.undo();
    session.sync().resume();
    assert!(!session.tree().is_expanded(0));
    assert_eq!(
        session.tree().selected(),
        Some(Position::At(NodeRef::head(1)))
    );

    assert!(session.expand(1).unwrap());
    assert_eq!(
        session.tree().selected(),
        Some(Position::At(NodeRef::child(0, 1)))
    );
    assert_eq!(session.violations(), 0);
}

#[test]
fn run_left_while_paused_collapses_on_resync() {
    let session = Session::default();
    for _ in 0..3 {
        session.commit("move", "Move");
    }
    assert!(session.tree().is_expanded(0));

    session.sync().pause();
    session.commit("fill", "Fill");
    assert!(session.tree().is_expanded(0));
    session.sync().resume();
    session.log().borrow_mut().resync_view();

    assert_eq!(session.current(), Position::At(NodeRef::head(1)));
    assert!(!session.tree().is_expanded(0));
    assert_eq!(
        session.tree().selected(),
        Some(Position::At(NodeRef::head(1)))
    );
    assert_eq!(session.violations(), 0);
}

#[test]
fn reattached_sync_keeps_following_the_cursor() {
    let session = Session::default();
    session.commit("a", "A");

    let sync = session.log().borrow_mut().detach().unwrap();
    assert!(!session.sync().is_disconnected());
    session.commit("b", "B");
    assert_eq!(
        session.tree().selected(),
        Some(Position::At(NodeRef::head(0)))
    );

    session.log().borrow_mut().attach(sync);
    assert_eq!(
        session.tree().selected(),
        Some(Position::At(NodeRef::head(1)))
    );
    session.commit("c", "C");
    assert_eq!(
        session.tree().selected(),
        Some(Position::At(NodeRef::head(2)))
    );
    assert_eq!(session.violations(), 0);
}

#[test]
fn leaf_rows_do_not_collapse() {
    let session = Session::default();
    session.commit("a", "A");
    assert_eq!(session.collapse(1), Ok(false));
    assert_eq!(
        session.collapse(7),
        Err(SessionError::View(evlog_core::ViewError::NoVisibleRow(7)))
    );
}

#[test]
fn view_error_releases_suppression_and_forces_rebuild() {
    let session = Session::default();
    session.commit("a", "A");
    let before = rebuilds(&session);

    session.calls().inject(ViewOp::Select, Fault::Error);
    session.commit("b", "B");
    assert!(!session.sync().is_suppressed());
    assert_eq!(session.current(), Position::At(NodeRef::head(1)));

    // A plain undo normally does not rebuild; after the failure it must.
    session.undo();
    assert_eq!(rebuilds(&session), before + 2);
    assert_eq!(
        session.tree().selected(),
        Some(Position::At(NodeRef::head(0)))
    );
    assert_eq!(session.violations(), 0);
}

#[test]
fn view_panic_releases_suppression() {
    let session = Session::default();
    session.commit("a", "A");
    session.calls().inject(ViewOp::Select, Fault::Panic);

    let result = catch_unwind(AssertUnwindSafe(|| {
        session.commit("b", "B");
    }));
    assert!(result.is_err());
    assert!(!session.sync().is_suppressed());
    assert!(!session.calls().in_view_call());

    // Everything keeps working.
    session.commit("c", "C");
    assert_eq!(
        session.tree().selected(),
        Some(Position::At(NodeRef::head(2)))
    );
    session.click(1).unwrap();
    assert_eq!(session.current(), Position::At(NodeRef::head(0)));
    assert_eq!(session.violations(), 0);
}

#[test]
fn disconnected_view_stops_following() {
    let session = Session::default();
    session.commit("a", "A");
    session.sync().disconnect();
    assert_eq!(session.tree().connection_count(), 0);

    session.commit("b", "B");
    assert_eq!(session.current(), Position::At(NodeRef::head(1)));
    assert_eq!(
        session.tree().selected(),
        Some(Position::At(NodeRef::head(0)))
    );
    // Clicks reach no handler.
    session.click(0).unwrap();
    assert_eq!(session.handler_runs(), 0);
    assert_eq!(session.current(), Position::At(NodeRef::head(1)));
}

#[test]
fn blocked_callbacks_ignore_clicks() {
    let session = Session::default();
    session.commit("a", "A");
    session.commit("b", "B");
    session.sync().block_callbacks();
    session.click(1).unwrap();
    assert_eq!(session.current(), Position::At(NodeRef::head(1)));
    session.sync().unblock_callbacks();
    session.click(0).unwrap();
    assert_eq!(session.current(), Position::Start);
    assert_eq!(session.handler_runs(), 1);
}
