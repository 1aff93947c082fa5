//! Async client for the Jira Cloud REST API (v3)
//!
//! Covers the operations the classifier's intents map to: create, read,
//! update, transition, comment. Rich-text fields go over the wire as
//! single-paragraph Atlassian Document Format bodies.

use crate::config::JiraConfig;
use crate::error::{BotError, Result};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

pub struct JiraService {
    client: Client,
    config: JiraConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedIssue {
    pub id: String,
    pub key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub id: String,
    pub key: String,
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: Option<IssueStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueStatus {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transition {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct TransitionList {
    #[serde(default)]
    transitions: Vec<Transition>,
}

/// Fields accepted by [`JiraService::update_issue`]. Assignee is matched by
/// name, which Jira resolves server-side.
#[derive(Debug, Default, Clone)]
pub struct UpdateFields {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub assignee: Option<String>,
}

impl UpdateFields {
    pub fn summary(value: impl Into<String>) -> Self {
        Self {
            summary: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn description(value: impl Into<String>) -> Self {
        Self {
            description: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn assignee(value: impl Into<String>) -> Self {
        Self {
            assignee: Some(value.into()),
            ..Self::default()
        }
    }

    fn is_empty(&self) -> bool {
        self.summary.is_none() && self.description.is_none() && self.assignee.is_none()
    }
}

impl JiraService {
    pub fn new(config: JiraConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn browse_url(&self, issue_key: &str) -> String {
        self.config.browse_url(issue_key)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/rest/api/3{}", self.config.url, path)
    }

    pub async fn create_issue(
        &self,
        project_key: &str,
        summary: &str,
        description: &str,
        issue_type: &str,
    ) -> Result<CreatedIssue> {
        let mut fields = json!({
            "project": { "key": project_key },
            "summary": summary,
            "issuetype": { "name": issue_type },
        });
        if !description.is_empty() {
            fields["description"] = adf_paragraph(description);
        }

        debug!(project_key, issue_type, "creating issue");
        let response = self
            .client
            .post(self.api_url("/issue"))
            .basic_auth(&self.config.username, Some(&self.config.api_token))
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        let created: CreatedIssue = self.checked(response).await?.json().await?;
        info!(key = %created.key, "created issue");
        Ok(created)
    }

    /// `Ok(None)` when the issue does not exist or is not visible to this
    /// account (Jira reports both as 404).
    pub async fn get_issue(&self, issue_key: &str) -> Result<Option<Issue>> {
        let response = self
            .client
            .get(self.api_url(&format!("/issue/{issue_key}")))
            .basic_auth(&self.config.username, Some(&self.config.api_token))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(self.checked(response).await?.json().await?))
    }

    pub async fn update_issue(&self, issue_key: &str, fields: UpdateFields) -> Result<()> {
        if fields.is_empty() {
            return Err(BotError::NothingToUpdate(issue_key.to_string()));
        }
        if self.get_issue(issue_key).await?.is_none() {
            return Err(BotError::IssueNotFound(issue_key.to_string()));
        }

        let response = self
            .client
            .put(self.api_url(&format!("/issue/{issue_key}")))
            .basic_auth(&self.config.username, Some(&self.config.api_token))
            .json(&json!({ "fields": update_body(fields) }))
            .send()
            .await?;
        self.checked(response).await?;
        info!(issue_key, "updated issue");
        Ok(())
    }

    pub async fn transitions(&self, issue_key: &str) -> Result<Vec<Transition>> {
        let response = self
            .client
            .get(self.api_url(&format!("/issue/{issue_key}/transitions")))
            .basic_auth(&self.config.username, Some(&self.config.api_token))
            .send()
            .await?;
        let list: TransitionList = self.checked(response).await?.json().await?;
        Ok(list.transitions)
    }

    /// Transition by name. The name must match one of the workflow's
    /// available transitions (case-insensitive); otherwise the error lists
    /// what is available.
    pub async fn transition_issue(&self, issue_key: &str, transition_name: &str) -> Result<()> {
        let transitions = self.transitions(issue_key).await?;
        let Some(transition) = find_transition(&transitions, transition_name) else {
            let available = transitions
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(BotError::TransitionNotFound {
                issue_key: issue_key.to_string(),
                name: transition_name.to_string(),
                available,
            });
        };

        let response = self
            .client
            .post(self.api_url(&format!("/issue/{issue_key}/transitions")))
            .basic_auth(&self.config.username, Some(&self.config.api_token))
            .json(&json!({ "transition": { "id": transition.id } }))
            .send()
            .await?;
        self.checked(response).await?;
        info!(issue_key, transition_name, "transitioned issue");
        Ok(())
    }

    pub async fn add_comment(&self, issue_key: &str, body: &str) -> Result<()> {
        let response = self
            .client
            .post(self.api_url(&format!("/issue/{issue_key}/comment")))
            .basic_auth(&self.config.username, Some(&self.config.api_token))
            .json(&comment_body(body))
            .send()
            .await?;
        self.checked(response).await?;
        info!(issue_key, "added comment");
        Ok(())
    }

    async fn checked(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(BotError::Jira {
            status,
            message: error_message(&body),
        })
    }
}

/// Wrap plain text in the single-paragraph ADF body the v3 API requires for
/// rich-text fields.
fn adf_paragraph(text: &str) -> Value {
    json!({
        "type": "doc",
        "version": 1,
        "content": [{
            "type": "paragraph",
            "content": [{ "type": "text", "text": text }]
        }]
    })
}

/// The `fields` object for an issue update. Summary is plain text,
/// description goes as ADF, assignee is matched by name server-side.
fn update_body(fields: UpdateFields) -> serde_json::Map<String, Value> {
    let mut body = serde_json::Map::new();
    if let Some(summary) = fields.summary {
        body.insert("summary".to_string(), Value::String(summary));
    }
    if let Some(description) = fields.description {
        body.insert("description".to_string(), adf_paragraph(&description));
    }
    if let Some(assignee) = fields.assignee {
        body.insert("assignee".to_string(), json!({ "name": assignee }));
    }
    body
}

fn comment_body(text: &str) -> Value {
    json!({ "body": adf_paragraph(text) })
}

fn find_transition<'a>(transitions: &'a [Transition], name: &str) -> Option<&'a Transition> {
    transitions.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

/// Flatten Jira's error body (`errorMessages` list plus `errors` map) into
/// one line; fall back to the raw body.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(default, rename = "errorMessages")]
        error_messages: Vec<String>,
        #[serde(default)]
        errors: serde_json::Map<String, Value>,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if !parsed.error_messages.is_empty() {
            return parsed.error_messages.join("; ");
        }
        if !parsed.errors.is_empty() {
            return Value::Object(parsed.errors).to_string();
        }
    }
    if body.is_empty() {
        "no response body".to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adf_paragraph_shape() {
        let doc = adf_paragraph("As a user I want a profile page");
        assert_eq!(doc["type"], "doc");
        assert_eq!(doc["version"], 1);
        assert_eq!(
            doc["content"][0]["content"][0]["text"],
            "As a user I want a profile page"
        );
    }

    #[test]
    fn test_find_transition_case_insensitive() {
        let transitions = vec![
            Transition {
                id: "11".to_string(),
                name: "In Progress".to_string(),
            },
            Transition {
                id: "31".to_string(),
                name: "Done".to_string(),
            },
        ];
        assert_eq!(find_transition(&transitions, "in progress").unwrap().id, "11");
        assert_eq!(find_transition(&transitions, "DONE").unwrap().id, "31");
        assert!(find_transition(&transitions, "Abandoned").is_none());
    }

    #[test]
    fn test_error_message_from_error_messages_list() {
        let body = r#"{"errorMessages":["Issue does not exist"],"errors":{}}"#;
        assert_eq!(error_message(body), "Issue does not exist");
    }

    #[test]
    fn test_error_message_from_errors_map() {
        let body = r#"{"errorMessages":[],"errors":{"project":"project is required"}}"#;
        assert!(error_message(body).contains("project is required"));
    }

    #[test]
    fn test_error_message_raw_fallback() {
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
        assert_eq!(error_message(""), "no response body");
    }

    #[test]
    fn test_update_fields_constructors() {
        assert!(UpdateFields::default().is_empty());
        let fields = UpdateFields::summary("New Title");
        assert_eq!(fields.summary.as_deref(), Some("New Title"));
        assert!(!fields.is_empty());
    }

    #[test]
    fn test_update_body_summary_is_plain_text() {
        let body = update_body(UpdateFields::summary("New Title"));
        assert_eq!(body["summary"], "New Title");
        assert!(!body.contains_key("description"));
        assert!(!body.contains_key("assignee"));
    }

    #[test]
    fn test_update_body_description_is_adf() {
        let body = update_body(UpdateFields::description("New details"));
        assert_eq!(body["description"]["type"], "doc");
        assert_eq!(
            body["description"]["content"][0]["content"][0]["text"],
            "New details"
        );
    }

    #[test]
    fn test_update_body_assignee_by_name() {
        let body = update_body(UpdateFields::assignee("jdoe"));
        assert_eq!(body["assignee"]["name"], "jdoe");
        assert!(!body.contains_key("summary"));
    }

    #[test]
    fn test_comment_body_is_adf() {
        let body = comment_body("Deployed to staging");
        assert_eq!(body["body"]["type"], "doc");
        assert_eq!(
            body["body"]["content"][0]["content"][0]["text"],
            "Deployed to staging"
        );
    }
}
