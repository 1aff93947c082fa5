//! Core data types for classification results

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Entity key names used in [`ParseResult::entities`].
pub mod keys {
    pub const ISSUE_TYPE: &str = "issue_type";
    pub const DESCRIPTION: &str = "description";
    pub const PROJECT_KEY: &str = "project_key";
    pub const SUMMARY: &str = "summary";
    pub const ISSUE_KEY: &str = "issue_key";
    pub const TRANSITION_NAME: &str = "transition_name";
    pub const FIELD: &str = "field";
    pub const NEW_VALUE: &str = "new_value";
}

/// The closed set of intents a command can resolve to.
///
/// `Unclear*` variants mean the intent was recognized but a mandatory entity
/// is missing, so the caller can ask for the specific missing piece. `Error`
/// is the terminal degraded-classifier state, not a per-command outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Create,
    Transition,
    Modify,
    UnclearCreate,
    UnclearTransition,
    UnclearModify,
    Error,
    #[serde(other)]
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Create => "create",
            Intent::Transition => "transition",
            Intent::Modify => "modify",
            Intent::UnclearCreate => "unclear_create",
            Intent::UnclearTransition => "unclear_transition",
            Intent::UnclearModify => "unclear_modify",
            Intent::Error => "error",
            Intent::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one command line.
///
/// An entity key is present only when an extraction rule matched with a
/// non-empty value; consumers must treat absent keys as "not provided".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    pub intent: Intent,
    #[serde(default)]
    pub entities: AHashMap<String, String>,
    /// Diagnostic text, set only for the `error` intent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ParseResult {
    pub fn new(intent: Intent) -> Self {
        Self {
            intent,
            entities: AHashMap::new(),
            message: None,
        }
    }

    pub fn unknown() -> Self {
        Self::new(Intent::Unknown)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            intent: Intent::Error,
            entities: AHashMap::new(),
            message: Some(message.into()),
        }
    }

    pub fn entity(&self, key: &str) -> Option<&str> {
        self.entities.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.entities.insert(key.to_string(), value.into());
    }
}
