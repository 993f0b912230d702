#![forbid(unsafe_code)]

//! History scripts.
//!
//! One command per line; blank lines and `#` comments are skipped.
//!
//! ```text
//! # two moves and a fill
//! commit move Move shape
//! commit move Move shape
//! commit fill Fill red
//! undo
//! click 0
//! show
//! ```

use std::fmt;

use crate::error::{ReplayError, Result};

/// One script command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Perform a new action in the document.
    Commit { kind: String, description: String },
    Undo,
    Redo,
    ClearUndo,
    ClearRedo,
    /// Click a visible row of the history view.
    Click(usize),
    /// Collapse the run at a visible row.
    Collapse(usize),
    /// Expand the run at a visible row.
    Expand(usize),
    /// Record the current state in the output.
    Show,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Commit { kind, description } => write!(f, "commit {kind} {description}"),
            Self::Undo => f.write_str("undo"),
            Self::Redo => f.write_str("redo"),
            Self::ClearUndo => f.write_str("clear-undo"),
            Self::ClearRedo => f.write_str("clear-redo"),
            Self::Click(row) => write!(f, "click {row}"),
            Self::Collapse(row) => write!(f, "collapse {row}"),
            Self::Expand(row) => write!(f, "expand {row}"),
            Self::Show => f.write_str("show"),
        }
    }
}

/// A command and the 1-based line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub line: usize,
    pub command: Command,
}

/// Parse a whole script.
pub fn parse(text: &str) -> Result<Vec<Step>> {
    text.lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            Some(parse_line(index + 1, line).map(|command| Step {
                line: index + 1,
                command,
            }))
        })
        .collect()
}

fn parse_line(line: usize, text: &str) -> Result<Command> {
    let (word, rest) = text
        .split_once(char::is_whitespace)
        .map_or((text, ""), |(word, rest)| (word, rest.trim()));

    let bare = |command: Command| {
        if rest.is_empty() {
            Ok(command)
        } else {
            Err(ReplayError::parse(line, format!("`{word}` takes no arguments")))
        }
    };

    match word {
        "commit" => {
            let (kind, description) = rest
                .split_once(char::is_whitespace)
                .map(|(kind, description)| (kind, description.trim()))
                .filter(|(_, description)| !description.is_empty())
                .ok_or_else(|| {
                    ReplayError::parse(line, "`commit` needs a kind and a description")
                })?;
            Ok(Command::Commit {
                kind: kind.to_string(),
                description: description.to_string(),
            })
        }
        "undo" => bare(Command::Undo),
        "redo" => bare(Command::Redo),
        "clear-undo" => bare(Command::ClearUndo),
        "clear-redo" => bare(Command::ClearRedo),
        "show" => bare(Command::Show),
        "click" => row(line, word, rest).map(Command::Click),
        "collapse" => row(line, word, rest).map(Command::Collapse),
        "expand" => row(line, word, rest).map(Command::Expand),
        other => Err(ReplayError::parse(line, format!("unknown command `{other}`"))),
    }
}

fn row(line: usize, word: &str, arg: &str) -> Result<usize> {
    arg.parse()
        .map_err(|_| ReplayError::parse(line, format!("`{word}` needs a row number, got `{arg}`")))
}
