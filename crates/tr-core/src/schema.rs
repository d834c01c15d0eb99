//! JSON Schema generation for the runner wire format.
//!
//! Runner plugins written in other languages can validate their output
//! against these schemas.
//!
//! ```bash
//! testreport schema                 # list types
//! testreport schema RunnerMessage   # one schema
//! testreport schema --all
//! ```

use schemars::schema_for;
use serde_json::Value;
use std::collections::BTreeMap;

pub use crate::adapter::{RunnerMessage, RunnerOutcome, RunnerReport};
pub use tr_common::{Attachment, ExtraSpec, LogSection, Outcome, Phase, PhaseEvent, Status};

/// Available schema types with their descriptions.
pub fn available_schemas() -> Vec<(&'static str, &'static str)> {
    vec![
        ("RunnerMessage", "One line of the runner stream, tagged by type"),
        ("RunnerReport", "Runner report for one phase of one test"),
        ("RunnerOutcome", "Raw runner outcome (passed, failed, skipped, rerun)"),
        ("ExtraSpec", "Loosely typed attachment as sent by the runner"),
        ("Attachment", "Validated attachment"),
        ("PhaseEvent", "Normalized phase event"),
        ("Phase", "Lifecycle phase"),
        ("Status", "Raw per-phase status"),
        ("LogSection", "Captured output section"),
        ("Outcome", "Final report outcome"),
    ]
}

/// Generate JSON Schema for a type by name, or `None` if unknown.
pub fn generate_schema(type_name: &str) -> Option<Value> {
    let schema = match type_name {
        "RunnerMessage" => schema_for!(RunnerMessage),
        "RunnerReport" => schema_for!(RunnerReport),
        "RunnerOutcome" => schema_for!(RunnerOutcome),
        "ExtraSpec" => schema_for!(ExtraSpec),
        "Attachment" => schema_for!(Attachment),
        "PhaseEvent" => schema_for!(PhaseEvent),
        "Phase" => schema_for!(Phase),
        "Status" => schema_for!(Status),
        "LogSection" => schema_for!(LogSection),
        "Outcome" => schema_for!(Outcome),
        _ => return None,
    };
    serde_json::to_value(schema).ok()
}

/// Generate all schemas as a map from type name to schema.
pub fn generate_all_schemas() -> BTreeMap<String, Value> {
    available_schemas()
        .into_iter()
        .filter_map(|(name, _)| generate_schema(name).map(|s| (name.to_string(), s)))
        .collect()
}

/// Schema output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Json,
    JsonCompact,
}

/// Format a schema value for output.
pub fn format_schema(schema: &Value, format: SchemaFormat) -> serde_json::Result<String> {
    match format {
        SchemaFormat::Json => serde_json::to_string_pretty(schema),
        SchemaFormat::JsonCompact => serde_json::to_string(schema),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_schemas_generate() {
        for (name, _) in available_schemas() {
            assert!(generate_schema(name).is_some(), "schema for {name}");
        }
        assert_eq!(generate_all_schemas().len(), available_schemas().len());
    }

    #[test]
    fn test_unknown_schema_returns_none() {
        assert!(generate_schema("Plan").is_none());
        assert!(generate_schema("").is_none());
    }

    #[test]
    fn test_runner_message_schema_mentions_tags() {
        let schema = generate_schema("RunnerMessage").unwrap();
        let text = schema.to_string();
        for tag in ["session_start", "collection_finish", "report", "session_finish"] {
            assert!(text.contains(tag), "missing {tag}");
        }
    }

    #[test]
    fn test_format_schema() {
        let schema = generate_schema("Phase").unwrap();
        let pretty = format_schema(&schema, SchemaFormat::Json).unwrap();
        let compact = format_schema(&schema, SchemaFormat::JsonCompact).unwrap();
        assert!(pretty.contains('\n'));
        assert!(!compact.contains('\n'));
    }
}
