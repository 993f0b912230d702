#![forbid(unsafe_code)]

//! Runs a parsed script through a wired [`Session`].

use std::fmt::Write as _;

use evlog_core::EventLogConfig;
use evlog_harness::{Session, Snapshot};
use evlog_view::{HistoryTree, TreeGuides};
use serde::Serialize;
use tracing::{debug, info_span, warn};

use crate::error::{ReplayError, Result};
use crate::script::{Command, Step};

/// State recorded by a `show` command.
#[derive(Debug, Clone, Serialize)]
pub struct ShowPoint {
    pub line: usize,
    pub snapshot: Snapshot,
}

/// Everything a replay produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub shows: Vec<ShowPoint>,
    #[serde(rename = "final")]
    pub final_state: Snapshot,
    /// User actions that reached the undo-history controller.
    pub handler_runs: usize,
}

/// Replay `steps` against a fresh session.
///
/// Stops at the first user action that fails.
pub fn replay(steps: &[Step], config: EventLogConfig, guides: TreeGuides) -> Result<ReplayReport> {
    let tree = HistoryTree::new(&config).with_guides(guides);
    let session = Session::with_tree(config, tree);
    let mut shows = Vec::new();

    for step in steps {
        let _span = info_span!("evlog.replay_step", line = step.line).entered();
        debug!(command = %step.command, "replay");
        apply(&session, step).map_err(|source| ReplayError::Action {
            line: step.line,
            source,
        })?;
        if step.command == Command::Show {
            shows.push(ShowPoint {
                line: step.line,
                snapshot: session.snapshot(),
            });
        }
    }

    Ok(ReplayReport {
        shows,
        final_state: session.snapshot(),
        handler_runs: session.handler_runs(),
    })
}

fn apply(session: &Session, step: &Step) -> std::result::Result<(), evlog_harness::SessionError> {
    match &step.command {
        Command::Commit { kind, description } => {
            session.commit(kind.as_str(), description.as_str());
        }
        Command::Undo => {
            if !session.undo() {
                warn!(line = step.line, "nothing to undo");
            }
        }
        Command::Redo => {
            if !session.redo() {
                warn!(line = step.line, "nothing to redo");
            }
        }
        Command::ClearUndo => session.clear_undo(),
        Command::ClearRedo => session.clear_redo(),
        Command::Click(row) => session.click(*row)?,
        Command::Collapse(row) => {
            session.collapse(*row)?;
        }
        Command::Expand(row) => {
            session.expand(*row)?;
        }
        Command::Show => {}
    }
    Ok(())
}

/// Plain-text rendering of a report.
#[must_use]
pub fn render_text(report: &ReplayReport) -> String {
    let mut out = String::new();
    for show in &report.shows {
        render_snapshot(&mut out, &format!("line {}", show.line), &show.snapshot);
    }
    render_snapshot(&mut out, "final", &report.final_state);
    out
}

fn render_snapshot(out: &mut String, title: &str, snapshot: &Snapshot) {
    let _ = writeln!(out, "== {title}");
    for line in &snapshot.view {
        let _ = writeln!(out, "{line}");
    }
    let _ = writeln!(out, "undo: {}", snapshot.undo.label);
    let _ = writeln!(out, "redo: {}", snapshot.redo.label);
}
