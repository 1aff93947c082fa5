//! jira-nlu - natural language commands for a Jira-style tracker
//!
//! The rule-based classifier turns one line of free text into an intent plus
//! typed entities; the Jira service turns those into REST calls. An optional
//! LLM parser produces the same result shape.

pub mod classifier;
pub mod config;
pub mod error;
pub mod jira;
pub mod llm;
pub mod rules;
pub mod types;

pub use classifier::NluProcessor;
pub use error::{BotError, Result};
pub use types::{Intent, ParseResult};
