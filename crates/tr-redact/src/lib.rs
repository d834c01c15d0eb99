//! Environment metadata redaction for test reports.
//!
//! Reports embed a table of run metadata (interpreter version, plugins,
//! CI variables). Some of those values are secrets. This crate masks every
//! value whose key matches a configured pattern while keeping the length of
//! the displayed value, so the table layout stays recognizable.
//!
//! # Example
//!
//! ```
//! use indexmap::IndexMap;
//! use serde_json::json;
//! use tr_redact::EnvironmentRedactor;
//!
//! let redactor = EnvironmentRedactor::new(&["API_.*"]).unwrap();
//! let mut metadata = IndexMap::new();
//! metadata.insert("API_TOKEN".to_string(), json!("hunter2"));
//! metadata.insert("Python".to_string(), json!("3.12"));
//!
//! let redacted = redactor.redact(&metadata);
//! assert_eq!(redacted["API_TOKEN"], json!("▓▓▓▓▓▓▓"));
//! assert_eq!(redacted["Python"], json!("3.12"));
//! ```

pub mod action;
pub mod display;
pub mod engine;
pub mod error;

pub use action::Action;
pub use display::{display_value, string_form};
pub use engine::{mask, EnvironmentRedactor, RedactedValue, REDACTION_CHAR};
pub use error::{RedactionError, Result};
