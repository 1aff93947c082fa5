//! Rule-based command classifier: keyword intent dispatch plus ordered
//! entity extraction.
//!
//! Dispatch is first-match-wins in a fixed order (create, transition,
//! modify). A command containing both "create ... story" and "close" is
//! classified as create; do not reorder the branches without a product
//! decision.

use crate::rules::{self, RuleSet, ISSUE_TYPE_KEYWORDS};
use crate::types::{keys, Intent, ParseResult};

const TRANSITION_TRIGGERS: [&str; 4] = ["close", "resolve", "abandon", "transition"];
const MODIFY_TRIGGERS: [&str; 2] = ["modify", "update"];

/// Turns one line of free text into an intent plus entities.
///
/// Holds only an immutable reference to the shared rule tables, so
/// classification is a pure function of its input. If the tables failed to
/// compile, the processor is degraded and every call returns the `error`
/// intent; check [`NluProcessor::is_ready`] once at startup.
pub struct NluProcessor {
    rules: Result<&'static RuleSet, String>,
}

impl NluProcessor {
    pub fn new() -> Self {
        let rules = RuleSet::shared().map_err(|e| e.to_string());
        if let Err(e) = &rules {
            tracing::error!("failed to compile NLU rule set: {e}");
        }
        Self { rules }
    }

    pub fn is_ready(&self) -> bool {
        self.rules.is_ok()
    }

    /// Classify a command. Never panics; the worst case for well-formed setup
    /// is `unknown` with no entities.
    pub fn classify(&self, command_text: &str) -> ParseResult {
        let rules = match &self.rules {
            Ok(rules) => *rules,
            Err(e) => {
                return ParseResult::error(format!(
                    "NLU rules not loaded ({e}). Cannot process command."
                ))
            }
        };

        let lowered = command_text.to_lowercase();

        if (lowered.contains("create") || lowered.contains("new"))
            && ISSUE_TYPE_KEYWORDS.iter().any(|t| lowered.contains(t))
        {
            classify_create(rules, command_text, &lowered)
        } else if TRANSITION_TRIGGERS.iter().any(|t| lowered.contains(t)) {
            classify_transition(rules, command_text, &lowered)
        } else if MODIFY_TRIGGERS.iter().any(|t| lowered.contains(t)) {
            classify_modify(rules, command_text)
        } else {
            ParseResult::unknown()
        }
    }
}

impl Default for NluProcessor {
    fn default() -> Self {
        Self::new()
    }
}

fn classify_create(rules: &RuleSet, command_text: &str, lowered: &str) -> ParseResult {
    let mut result = ParseResult::new(Intent::Create);

    // First keyword in table order wins; the dispatch guard guarantees one is
    // present, but keep the Story default anyway.
    let issue_type = ISSUE_TYPE_KEYWORDS
        .iter()
        .find(|t| lowered.contains(*t))
        .map(|t| rules::capitalize(t))
        .unwrap_or_else(|| "Story".to_string());
    result.insert(keys::ISSUE_TYPE, issue_type);

    // Ordered extraction over a scratch copy. Description goes first (most
    // specific pattern), then the end-anchored project key, and the summary
    // reads whatever is left.
    let mut working = command_text.to_string();
    if let Some(description) = rules::take_capture(&rules.description, &mut working) {
        result.insert(keys::DESCRIPTION, description);
    }
    if let Some(project) = rules::take_capture(&rules.project_key, &mut working) {
        result.insert(keys::PROJECT_KEY, project.to_uppercase());
    }

    let summary = match rules.summary.captures(&working) {
        Some(caps) => caps
            .get(1)
            .map(|g| g.as_str().trim().to_string())
            .filter(|s| !s.is_empty()),
        None => rules::find_capture(&rules.summary_fallback, &working),
    };
    match summary {
        Some(summary) => result.insert(keys::SUMMARY, summary),
        // Summary is mandatory; project key and description are not gating.
        None => result.intent = Intent::UnclearCreate,
    }

    result
}

fn classify_transition(rules: &RuleSet, command_text: &str, lowered: &str) -> ParseResult {
    let mut result = ParseResult::new(Intent::Transition);

    // Issue key first; the "to ..." split below must not consume it.
    let issue_key = rules::find_capture(&rules.issue_key, command_text).map(|k| k.to_uppercase());
    if let Some(key) = &issue_key {
        result.insert(keys::ISSUE_KEY, key.clone());
    }

    let transition_name = if lowered.contains("close") {
        Some("Closed".to_string())
    } else if lowered.contains("resolve") {
        Some("Resolved".to_string())
    } else if lowered.contains("abandon") {
        Some("Abandoned".to_string())
    } else if lowered.contains("transition") && lowered.contains("to") {
        match lowered.split_once("to") {
            Some((_, remainder)) => {
                let mut phrase = remainder.trim().to_string();
                if let Some(key) = &issue_key {
                    phrase = phrase.replace(&key.to_lowercase(), "").trim().to_string();
                }
                phrase = rules
                    .issue_word
                    .replace_all(&phrase, "")
                    .trim()
                    .to_string();
                let titled = rules::title_case(&phrase);
                if titled.is_empty() {
                    None
                } else {
                    Some(titled)
                }
            }
            // "to" is a guaranteed substring on this branch, so this arm is
            // effectively dead; kept because downstream cannot tell this
            // literal apart from a transition actually named "Unknown".
            None => Some("Unknown".to_string()),
        }
    } else {
        None
    };
    if let Some(name) = transition_name {
        result.insert(keys::TRANSITION_NAME, name);
    }

    if result.entity(keys::ISSUE_KEY).is_none() || result.entity(keys::TRANSITION_NAME).is_none() {
        result.intent = Intent::UnclearTransition;
    }

    result
}

fn classify_modify(rules: &RuleSet, command_text: &str) -> ParseResult {
    let mut result = ParseResult::new(Intent::Modify);

    if let Some(key) = rules::find_capture(&rules.issue_key, command_text) {
        result.insert(keys::ISSUE_KEY, key.to_uppercase());
    }

    // Only summary and description edits are supported.
    if let Some(value) = rules::find_capture(&rules.modify_summary, command_text) {
        result.insert(keys::FIELD, "summary");
        result.insert(keys::NEW_VALUE, value);
    } else if let Some(value) = rules::find_capture(&rules.modify_description, command_text) {
        result.insert(keys::FIELD, "description");
        result.insert(keys::NEW_VALUE, value);
    }

    if result.entity(keys::ISSUE_KEY).is_none() || result.entity(keys::FIELD).is_none() {
        result.intent = Intent::UnclearModify;
    }

    result
}
