#![forbid(unsafe_code)]

use std::path::PathBuf;

use thiserror::Error;

use crate::tree::NodeRef;

/// Failure reported by a view while the log pushes cursor state into it.
///
/// The log never propagates these to the document engine; they are logged
/// and the push is abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("view has no row for node {0}")]
    UnknownRow(NodeRef),

    #[error("view has no group {0}")]
    UnknownGroup(usize),

    #[error("view has no visible row {0}")]
    NoVisibleRow(usize),

    #[error("view is disconnected")]
    Disconnected,

    #[error("view backend error: {0}")]
    Backend(String),
}

/// Errors raised while loading an [`EventLogConfig`](crate::EventLogConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {}", .0.join("; "))]
    Validation(Vec<String>),
}
