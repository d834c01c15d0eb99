//! Formats for command payloads on stdout.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Formats for the command payload printed on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Structured JSON (default for machine consumption)
    #[default]
    Json,

    /// One-line summary for quick status checks
    Summary,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Summary => write!(f, "summary"),
        }
    }
}
