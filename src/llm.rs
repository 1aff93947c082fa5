//! LLM-backed alternative parser
//!
//! Produces the same [`ParseResult`] shape as the rule-based classifier by
//! asking an OpenAI-compatible chat-completions API for strict JSON. Enabled
//! with `--llm`; the rule-based path stays the default.

use crate::error::{BotError, Result};
use crate::types::ParseResult;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub struct LlmParser {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
}

const SYSTEM_PROMPT: &str = r#"You turn one-line Jira commands into JSON.
Respond ONLY with a JSON object of this exact shape, no extra text:
{"intent": "...", "entities": {...}}

"intent" is one of: create, transition, modify, unclear_create,
unclear_transition, unclear_modify, unknown.

Recognized entity keys (include a key only when the command provides it):
issue_type, summary, description, project_key, issue_key, transition_name,
field, new_value.

Examples:
"create a story called 'Implement login' in project WEBAPP" ->
{"intent": "create", "entities": {"issue_type": "Story", "summary": "Implement login", "project_key": "WEBAPP"}}
"close WEBAPP-789" ->
{"intent": "transition", "entities": {"issue_key": "WEBAPP-789", "transition_name": "Closed"}}
"modify MYPROJ-123 summary to 'New Title'" ->
{"intent": "modify", "entities": {"issue_key": "MYPROJ-123", "field": "summary", "new_value": "New Title"}}
"#;

impl LlmParser {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
        }
    }

    /// Required: `LLM_API_KEY`. Optional: `LLM_API_URL`, `LLM_MODEL`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .map_err(|_| BotError::Llm("LLM_API_KEY not set".to_string()))?;
        let api_url = std::env::var("LLM_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        Ok(Self::new(api_key, api_url, model))
    }

    pub async fn parse(&self, command: &str) -> Result<ParseResult> {
        let reply = self.complete(SYSTEM_PROMPT, command).await?;
        let json_str = extract_json(&reply)?;
        serde_json::from_str(json_str)
            .map_err(|e| BotError::Llm(format!("unparseable LLM reply: {e} - {reply}")))
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            max_tokens: 300,
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Llm(e.to_string()))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Llm(format!("API error: {body}")));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| BotError::Llm(e.to_string()))?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| BotError::Llm("empty response".to_string()))
    }
}

/// Pull the outermost `{...}` span out of a completion that may carry
/// surrounding prose.
fn extract_json(response: &str) -> Result<&str> {
    let start = response
        .find('{')
        .ok_or_else(|| BotError::Llm("no JSON in response".to_string()))?;
    let end = response
        .rfind('}')
        .ok_or_else(|| BotError::Llm("no closing brace in response".to_string()))?;
    if end < start {
        return Err(BotError::Llm("no JSON object in response".to_string()));
    }
    Ok(&response[start..=end])
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{keys, Intent};

    #[test]
    fn test_extract_json_plain() {
        let reply = r#"{"intent": "unknown", "entities": {}}"#;
        assert_eq!(extract_json(reply).unwrap(), reply);
    }

    #[test]
    fn test_extract_json_with_surrounding_text() {
        let reply = "Here you go:\n{\"intent\": \"create\", \"entities\": {}}\nAnything else?";
        let json = extract_json(reply).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
    }

    #[test]
    fn test_extract_json_missing() {
        assert!(extract_json("I cannot parse that").is_err());
    }

    #[test]
    fn test_extract_json_closing_brace_before_opening() {
        // Both braces present but in the wrong order; must error, not panic.
        assert!(extract_json("} no json here {").is_err());
        assert!(extract_json("}{").is_err());
    }

    #[test]
    fn test_reply_deserializes_to_parse_result() {
        let json = r#"{"intent": "create", "entities": {"issue_type": "Story", "summary": "Implement login", "project_key": "WEBAPP"}}"#;
        let result: ParseResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.intent, Intent::Create);
        assert_eq!(result.entity(keys::SUMMARY), Some("Implement login"));
    }

    #[test]
    fn test_unexpected_intent_string_maps_to_unknown() {
        let json = r#"{"intent": "make_coffee", "entities": {}}"#;
        let result: ParseResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.intent, Intent::Unknown);
    }
}
