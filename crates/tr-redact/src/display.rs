//! Canonical display strings for metadata values.
//!
//! The environment table shows every value as text. Lists are stringified
//! element-wise and sorted, objects are dumped as JSON with sorted keys, so
//! two runs with the same metadata render byte-identical tables.

use serde_json::Value;

/// Python-style rendering of JSON `null`.
pub const NULL_DISPLAY: &str = "None";

/// Render a metadata value the way the environment table shows it.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => NULL_DISPLAY.to_string(),
        Value::Array(items) => {
            let mut parts: Vec<String> = items.iter().map(display_value).collect();
            parts.sort();
            parts.join(", ")
        }
        Value::Object(_) => sorted_json(value),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
    }
}

/// The value's plain string form, as the metadata source would print it.
///
/// Unlike [`display_value`], lists keep their order and lists and objects keep
/// their brackets and quotes. Masks are as wide as this string.
pub fn string_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => literal(other),
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::Null => NULL_DISPLAY.to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quoted(s),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let fields: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", quoted(k), literal(v)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
    }
}

/// Single quotes unless the text itself contains one and no double quote.
fn quoted(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// JSON text with sorted keys and `", "` / `": "` separators.
fn sorted_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let fields: Vec<String> = keys
                .into_iter()
                .map(|k| format!("{}: {}", Value::String(k.clone()), sorted_json(&map[k])))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(sorted_json).collect();
            format!("[{}]", items.join(", "))
        }
        other => other.to_string(),
    }
}
