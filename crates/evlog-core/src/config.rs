#![forbid(unsafe_code)]

//! Event log configuration.
//!
//! Every tunable of the log and its view sync lives in one
//! [`EventLogConfig`] that can be loaded from TOML or JSON. Missing fields
//! fall back to their defaults, so partial files are fine.
//!
//! ```toml
//! # evlog.toml
//! [grouping]
//! enabled = true
//!
//! [labels]
//! unchanged = "[Unchanged]"
//! undo = "Undo"
//! redo = "Redo"
//!
//! [view]
//! collapse_on_leave = true
//! ```
//!
//! ```rust,ignore
//! let config = EventLogConfig::load("evlog.toml")?;
//! let log = EventLog::new(config);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventLogConfig {
    /// Run grouping.
    pub grouping: GroupingConfig,
    /// Labels for the sentinel row and the undo/redo verbs.
    pub labels: LabelConfig,
    /// View synchronisation behaviour.
    pub view: ViewConfig,
}

impl EventLogConfig {
    /// Parse from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Parse from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a TOML file from disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read(path.as_ref())?)
    }

    /// Load a JSON file from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&read(path.as_ref())?)
    }

    /// Load a file, picking the format from its extension (`.json` is JSON,
    /// anything else TOML), and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_file(path)?
        } else {
            Self::from_toml_file(path)?
        };
        config.validated()
    }

    /// Check every parameter.
    ///
    /// Returns a list of problems; an empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.labels.unchanged.trim().is_empty() {
            errors.push("labels.unchanged must not be empty".into());
        }
        if self.labels.undo.trim().is_empty() {
            errors.push("labels.undo must not be empty".into());
        }
        if self.labels.redo.trim().is_empty() {
            errors.push("labels.redo must not be empty".into());
        }

        errors
    }

    /// Return `self` if [`validate`](Self::validate) finds nothing.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Grouping of consecutive same-kind events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Fold consecutive same-kind commits into one run. Default: true.
    pub enabled: bool,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// User-facing labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Label of the "nothing applied" row. Default: `[Unchanged]`.
    pub unchanged: String,
    /// Undo verb. Default: `Undo`.
    pub undo: String,
    /// Redo verb. Default: `Redo`.
    pub redo: String,
    /// Between the verb and the event description. Default: `": "`.
    pub separator: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            unchanged: "[Unchanged]".into(),
            undo: "Undo".into(),
            redo: "Redo".into(),
            separator: ": ".into(),
        }
    }
}

/// How the view follows the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ViewConfig {
    /// Collapse a run once the cursor leaves it. Default: true.
    pub collapse_on_leave: bool,
    /// Scroll the current row into view after each push. Default: true.
    pub scroll_to_current: bool,
    /// Show the sentinel row above the first event. Default: true.
    pub show_sentinel: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            collapse_on_leave: true,
            scroll_to_current: true,
            show_sentinel: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_validates_clean() {
        assert!(EventLogConfig::default().validate().is_empty());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EventLogConfig::from_toml_str(
            r#"
            [labels]
            undo = "Revert"
            "#,
        )
        .unwrap();
        assert_eq!(config.labels.undo, "Revert");
        assert_eq!(config.labels.redo, "Redo");
        assert!(config.grouping.enabled);
        assert!(config.view.collapse_on_leave);
    }

    #[test]
    fn json_disables_grouping() {
        let config = EventLogConfig::from_json_str(r#"{"grouping":{"enabled":false}}"#).unwrap();
        assert!(!config.grouping.enabled);
        assert_eq!(config.labels, LabelConfig::default());
    }

    #[test]
    fn empty_labels_collect_every_error() {
        let mut config = EventLogConfig::default();
        config.labels.undo = " ".into();
        config.labels.redo = String::new();
        let errors = config.validate();
        assert_eq!(errors.len(), 2, "{errors:?}");
        assert!(matches!(
            config.validated(),
            Err(ConfigError::Validation(list)) if list.len() == 2
        ));
    }

    #[test]
    fn bad_toml_reports_parse_error() {
        let err = EventLogConfig::from_toml_str("[grouping]\nenabled = \"yes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn load_picks_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("evlog.json");
        let mut file = std::fs::File::create(&json_path).unwrap();
        write!(file, r#"{{"view":{{"show_sentinel":false}}}}"#).unwrap();
        let config = EventLogConfig::load(&json_path).unwrap();
        assert!(!config.view.show_sentinel);

        let toml_path = dir.path().join("evlog.toml");
        std::fs::write(&toml_path, "[labels]\nunchanged = \"Opened\"\n").unwrap();
        let config = EventLogConfig::load(&toml_path).unwrap();
        assert_eq!(config.labels.unchanged, "Opened");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = EventLogConfig::load("/nonexistent/evlog.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/evlog.toml"));
    }
}
