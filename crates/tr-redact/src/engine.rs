//! Environment redactor.
//!
//! Masks metadata values whose key matches any configured pattern. Patterns
//! use "match" semantics: anchored at the start of the key but not at the end,
//! so `^TOKEN` and `TOKEN` behave the same and `TOKEN` also hides
//! `TOKEN_SECONDARY`.

use crate::display::string_form;
use crate::{Action, RedactionError, Result};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Character used to mask redacted values (U+2593 DARK SHADE).
pub const REDACTION_CHAR: char = '\u{2593}';

/// Result of redacting one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactedValue {
    /// The value to display.
    pub output: Value,

    /// The action that was applied.
    pub action_applied: Action,
}

impl RedactedValue {
    /// Create a value that was allowed through unchanged.
    pub fn allowed(value: Value) -> Self {
        Self {
            output: value,
            action_applied: Action::Allow,
        }
    }

    /// Mask a value, preserving the length of its string form.
    pub fn masked(value: &Value) -> Self {
        let width = string_form(value).chars().count();
        Self {
            output: Value::String(mask(width)),
            action_applied: Action::Mask,
        }
    }
}

/// A string of `width` mask characters.
pub fn mask(width: usize) -> String {
    std::iter::repeat(REDACTION_CHAR).take(width).collect()
}

/// Compiled set of key patterns.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentRedactor {
    patterns: Vec<Regex>,
}

impl EnvironmentRedactor {
    /// Compile the given patterns. Fails on the first invalid one.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| compile_anchored(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// A redactor that never masks anything.
    pub fn none() -> Self {
        Self::default()
    }

    /// Number of configured patterns.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Whether any pattern matches at the start of `key`.
    pub fn is_redactable(&self, key: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(key))
    }

    /// Redact a single entry.
    pub fn redact_entry(&self, key: &str, value: &Value) -> RedactedValue {
        if self.is_redactable(key) {
            debug!(key, "Masking environment value");
            RedactedValue::masked(value)
        } else {
            RedactedValue::allowed(value.clone())
        }
    }

    /// Return a copy of `metadata` with every matching value masked.
    ///
    /// Key order is preserved.
    pub fn redact(&self, metadata: &IndexMap<String, Value>) -> IndexMap<String, Value> {
        metadata
            .iter()
            .map(|(key, value)| (key.clone(), self.redact_entry(key, value).output))
            .collect()
    }
}

fn compile_anchored(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})")).map_err(|source| RedactionError::PatternError {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn metadata(entries: &[(&str, Value)]) -> IndexMap<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_match_is_anchored_at_start_only() {
        let redactor = EnvironmentRedactor::new(&["TOKEN"]).unwrap();
        assert!(redactor.is_redactable("TOKEN"));
        assert!(redactor.is_redactable("TOKEN_SECONDARY"));
        assert!(!redactor.is_redactable("MY_TOKEN"));
    }

    #[test]
    fn test_mask_preserves_display_length() {
        let redactor = EnvironmentRedactor::new(&["^TOKEN$"]).unwrap();
        let out = redactor.redact(&metadata(&[("TOKEN", json!("secret"))]));
        assert_eq!(out["TOKEN"], json!("▓▓▓▓▓▓"));
    }

    #[test]
    fn test_non_string_values_mask_their_string_form() {
        let redactor = EnvironmentRedactor::new(&["Plugins"]).unwrap();
        let out = redactor.redact(&metadata(&[("Plugins", json!(["ab", "c"]))]));
        // "['ab', 'c']"
        assert_eq!(out["Plugins"], json!(mask(11)));

        let out = redactor.redact(&metadata(&[("Plugins", json!(null))]));
        assert_eq!(out["Plugins"], json!(mask(4)));
    }

    #[test]
    fn test_unmatched_entries_pass_through_in_order() {
        let redactor = EnvironmentRedactor::new(&["SECRET.*"]).unwrap();
        let input = metadata(&[
            ("Python", json!("3.12")),
            ("SECRET_KEY", json!("abc")),
            ("Packages", json!({"pytest": "8"})),
        ]);
        let out = redactor.redact(&input);

        let keys: Vec<&str> = out.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Python", "SECRET_KEY", "Packages"]);
        assert_eq!(out["Python"], json!("3.12"));
        assert_eq!(out["Packages"], json!({"pytest": "8"}));
        assert_eq!(out["SECRET_KEY"], json!("▓▓▓"));
    }

    #[test]
    fn test_alternation_is_grouped_under_anchor() {
        let redactor = EnvironmentRedactor::new(&["A|B"]).unwrap();
        assert!(redactor.is_redactable("B_KEY"));
        assert!(!redactor.is_redactable("XB"));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = EnvironmentRedactor::new(&["ok", "(unclosed"]).unwrap_err();
        assert_eq!(err.pattern(), Some("(unclosed"));
    }

    #[test]
    fn test_empty_redactor_allows_everything() {
        let redactor = EnvironmentRedactor::none();
        assert_eq!(redactor.pattern_count(), 0);
        let entry = redactor.redact_entry("TOKEN", &json!("x"));
        assert_eq!(entry.action_applied, Action::Allow);
    }
}
