//! Jira connection settings loaded from the environment

use crate::error::{BotError, Result};

/// Connection settings for the Jira REST API.
///
/// Read from `JIRA_URL`, `JIRA_USERNAME` (account email on Jira Cloud) and
/// `JIRA_API_TOKEN`. Credentials live in the environment, never in the
/// repository.
#[derive(Debug, Clone)]
pub struct JiraConfig {
    pub url: String,
    pub username: String,
    pub api_token: String,
}

impl JiraConfig {
    pub fn from_env() -> Result<Self> {
        let url = require("JIRA_URL")?;
        let username = require("JIRA_USERNAME")?;
        let api_token = require("JIRA_API_TOKEN")?;
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            username,
            api_token,
        })
    }

    /// Human-facing link for a created or updated issue.
    pub fn browse_url(&self, issue_key: &str) -> String {
        format!("{}/browse/{}", self.url, issue_key)
    }
}

fn require(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(BotError::Config(format!("{name} is not set"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browse_url() {
        let config = JiraConfig {
            url: "https://example.atlassian.net".to_string(),
            username: "user@example.com".to_string(),
            api_token: "token".to_string(),
        };
        assert_eq!(
            config.browse_url("AIK-1"),
            "https://example.atlassian.net/browse/AIK-1"
        );
    }

    #[test]
    fn test_require_missing_variable() {
        let result = require("JIRA_NLU_DEFINITELY_UNSET_VARIABLE");
        assert!(matches!(result, Err(BotError::Config(_))));
    }
}
