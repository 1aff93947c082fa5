//! Error types shared across the crate

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("Jira API error ({status}): {message}")]
    Jira {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("issue not found: {0}")]
    IssueNotFound(String),

    #[error("no transition named '{name}' available for {issue_key} (available: {available})")]
    TransitionNotFound {
        issue_key: String,
        name: String,
        available: String,
    },

    #[error("no updatable fields provided for {0}")]
    NothingToUpdate(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BotError>;
