//! Extraction rules: regex tables compiled once per process, plus the
//! span-stripping helpers the classifier drives them with.
//!
//! Rules for a given intent run in a fixed order. A successful match may
//! remove its span from the working copy of the command so later rules never
//! re-claim text an earlier rule already consumed. That ordering is
//! load-bearing; see the stripping tests in `classifier`.

use regex::Regex;
use std::sync::OnceLock;

/// Issue-type keywords checked in order; first hit wins.
pub const ISSUE_TYPE_KEYWORDS: [&str; 4] = ["story", "task", "defect", "bug"];

/// The compiled pattern tables. Immutable after construction and shared
/// process-wide via [`RuleSet::shared`].
pub struct RuleSet {
    /// `(with|and) description '…'` — runs first in the create branch.
    pub description: Regex,
    /// `(in|for|on) [project]? KEY` anchored at the end of the working text.
    pub project_key: Regex,
    /// Primary quoted-summary pattern with an optional lead-in word.
    pub summary: Regex,
    /// Unquoted trailing text after a type keyword.
    pub summary_fallback: Regex,
    /// `ABC-123` style issue keys.
    pub issue_key: Regex,
    /// `summary|title (to|as) '…'` for the modify branch.
    pub modify_summary: Regex,
    /// `description (to|as) '…'` for the modify branch.
    pub modify_description: Regex,
    /// Bare word "issue", stripped out of transition phrases.
    pub issue_word: Regex,
}

impl RuleSet {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            description: Regex::new(r#"(?i)(?:with|and)\s+description\s*['"](.+?)['"]"#)?,
            project_key: Regex::new(r"(?i)(?:in|for|on)\s*(?:project)?\s*\b([A-Z]{2,10})\b$")?,
            summary: Regex::new(r#"(?i)(?:called|titled|for|summary)?\s*['"](.+?)['"]"#)?,
            summary_fallback: Regex::new(
                r"(?i)(?:create|new)\s*(?:a|an)?\s*(?:story|task|defect|bug)\s*(.+?)$",
            )?,
            issue_key: Regex::new(r"(?i)\b([A-Z]{1,10}-\d+)\b")?,
            modify_summary: Regex::new(r#"(?i)(?:summary|title)\s*(?:to|as)\s*['"](.+?)['"]"#)?,
            modify_description: Regex::new(r#"(?i)description\s*(?:to|as)\s*['"](.+?)['"]"#)?,
            issue_word: Regex::new(r"(?i)\bissue\b")?,
        })
    }

    /// Compile once for the process lifetime; afterwards the set is read-only
    /// and safe to share across threads.
    pub fn shared() -> Result<&'static RuleSet, &'static regex::Error> {
        static RULES: OnceLock<Result<RuleSet, regex::Error>> = OnceLock::new();
        RULES.get_or_init(RuleSet::compile).as_ref()
    }
}

/// Capture group 1 and strip the whole matched span from `working`, trimming
/// the leftovers so end-anchored rules still see a clean boundary.
///
/// Returns `None` on no match or a whitespace-only capture; in both cases the
/// caller leaves the entity absent.
pub fn take_capture(re: &Regex, working: &mut String) -> Option<String> {
    let (span, value) = {
        let caps = re.captures(working)?;
        let whole = caps.get(0)?;
        let value = caps.get(1).map(|g| g.as_str().trim().to_string());
        (whole.range(), value)
    };
    working.replace_range(span, "");
    let trimmed = working.trim().to_string();
    *working = trimmed;
    value.filter(|v| !v.is_empty())
}

/// Capture group 1 without touching the text.
pub fn find_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|g| g.as_str().trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Upper-case the first letter of each whitespace-separated word and
/// lower-case the rest ("in progress" -> "In Progress").
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// "story" -> "Story"
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_set_compiles() {
        assert!(RuleSet::shared().is_ok());
    }

    #[test]
    fn test_take_capture_strips_span_and_trims() {
        let rules = RuleSet::shared().unwrap();
        let mut working =
            "create a story 'User profile' in project MYPROJ with description 'Add a page.'"
                .to_string();
        let description = take_capture(&rules.description, &mut working);
        assert_eq!(description.as_deref(), Some("Add a page."));
        // The working copy must end cleanly so the $-anchored project rule
        // can still fire.
        assert_eq!(working, "create a story 'User profile' in project MYPROJ");
    }

    #[test]
    fn test_take_capture_no_match_leaves_text() {
        let rules = RuleSet::shared().unwrap();
        let mut working = "close WEBAPP-789".to_string();
        assert!(take_capture(&rules.description, &mut working).is_none());
        assert_eq!(working, "close WEBAPP-789");
    }

    #[test]
    fn test_project_key_anchored_at_end() {
        let rules = RuleSet::shared().unwrap();
        // The "in AJAX" mid-string must not win over the trailing "in AIK".
        let key = find_capture(&rules.project_key, "create task 'Design UI in AJAX' in AIK");
        assert_eq!(key.as_deref(), Some("AIK"));
        assert!(find_capture(&rules.project_key, "create a story with no key").is_none());
    }

    #[test]
    fn test_issue_key_pattern() {
        let rules = RuleSet::shared().unwrap();
        assert_eq!(
            find_capture(&rules.issue_key, "please close webapp-789 now").as_deref(),
            Some("webapp-789")
        );
        assert!(find_capture(&rules.issue_key, "close issue").is_none());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("in progress"), "In Progress");
        assert_eq!(title_case("  done "), "Done");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("story"), "Story");
        assert_eq!(capitalize("BUG"), "Bug");
    }
}
