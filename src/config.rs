//! Overlay configuration
//!
//! Settings can be built in code, or loaded from TOML:
//!
//! ```toml
//! init_on = ["created", "fetched"]
//! state_field = "status"
//! on_commit_failure = "roll_back"
//! on_ambiguity = "reject"
//! history_limit = 100
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// What to do with the in-memory state when the commit after a successful
/// handler fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitFailurePolicy {
    /// Leave the new state in memory, ahead of the durable record.
    /// Commit signals are still suppressed.
    #[default]
    KeepDivergence,

    /// Restore the previous state field value before reporting the error.
    RollBack,
}

/// How overlapping sources for one event name are treated when the
/// table is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Allow overlaps; the first candidate in declaration order wins.
    #[default]
    FirstMatch,

    /// Refuse to build a table with overlapping sources.
    Reject,
}

/// Configuration for one overlay instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Lifecycle events that arm the state machine
    #[serde(default = "default_init_on")]
    pub init_on: Vec<String>,

    /// Entity field holding the current state
    #[serde(default = "default_state_field")]
    pub state_field: String,

    #[serde(default)]
    pub on_commit_failure: CommitFailurePolicy,

    #[serde(default)]
    pub on_ambiguity: AmbiguityPolicy,

    /// Most recent journal records kept per instance; 0 keeps every record
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_init_on() -> Vec<String> {
    vec!["created".to_string(), "fetched".to_string()]
}

fn default_state_field() -> String {
    "state".to_string()
}

fn default_history_limit() -> usize {
    1024
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            init_on: default_init_on(),
            state_field: default_state_field(),
            on_commit_failure: CommitFailurePolicy::default(),
            on_ambiguity: AmbiguityPolicy::default(),
            history_limit: default_history_limit(),
        }
    }
}

impl OverlayConfig {
    /// Parse configuration from a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!("Loading overlay config from {:?}", path);
        Self::from_toml_str(&contents)
    }

    pub fn with_init_on<I, T>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.init_on = events.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_state_field(mut self, field: impl Into<String>) -> Self {
        self.state_field = field.into();
        self
    }

    pub fn with_commit_failure(mut self, policy: CommitFailurePolicy) -> Self {
        self.on_commit_failure = policy;
        self
    }

    pub fn with_ambiguity(mut self, policy: AmbiguityPolicy) -> Self {
        self.on_ambiguity = policy;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Whether `event` is one of the arming lifecycle events
    pub fn arms_on(&self, event: &str) -> bool {
        self.init_on.iter().any(|e| e == event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OverlayConfig::default();
        assert_eq!(config.init_on, vec!["created", "fetched"]);
        assert_eq!(config.state_field, "state");
        assert_eq!(config.on_commit_failure, CommitFailurePolicy::KeepDivergence);
        assert_eq!(config.on_ambiguity, AmbiguityPolicy::FirstMatch);
        assert_eq!(config.history_limit, 1024);
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r#"
init_on = ["fetched"]
state_field = "status"
on_commit_failure = "roll_back"
on_ambiguity = "reject"
history_limit = 0
        "#;

        let config = OverlayConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.init_on, vec!["fetched"]);
        assert_eq!(config.state_field, "status");
        assert_eq!(config.on_commit_failure, CommitFailurePolicy::RollBack);
        assert_eq!(config.on_ambiguity, AmbiguityPolicy::Reject);
        assert_eq!(config.history_limit, 0);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = OverlayConfig::from_toml_str("state_field = \"phase\"").unwrap();
        assert_eq!(config.state_field, "phase");
        assert!(config.arms_on("created"));
        assert!(config.arms_on("fetched"));
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let result = OverlayConfig::from_toml_str("on_commit_failure = \"retry\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = OverlayConfig::from_file("/nonexistent/statekeep.toml").unwrap_err();
        assert!(err.to_string().contains("statekeep.toml"));
    }

    #[test]
    fn test_builder_setters() {
        let config = OverlayConfig::default()
            .with_init_on(["loaded"])
            .with_state_field("status")
            .with_commit_failure(CommitFailurePolicy::RollBack);

        assert!(config.arms_on("loaded"));
        assert!(!config.arms_on("created"));
        assert_eq!(config.state_field, "status");
    }
}
