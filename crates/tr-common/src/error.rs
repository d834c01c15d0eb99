//! Error types shared by the test report crates.
//!
//! These errors describe malformed input at the runner boundary: unknown
//! phases, statuses or attachment formats, and attachments that are missing
//! the fields their format requires.

use thiserror::Error;

/// Result type alias for shared operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for shared model parsing.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown phase: {0}")]
    UnknownPhase(String),

    #[error("unknown status: {0}")]
    UnknownStatus(String),

    #[error("unknown outcome: {0}")]
    UnknownOutcome(String),

    #[error("unknown attachment format: {0}")]
    UnknownFormat(String),

    #[error("{format} attachment is missing its content")]
    MissingContent { format: String },

    #[error("{format} attachment content must be a string, got {found}")]
    NonStringContent { format: String, found: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns a stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Error::UnknownPhase(_) => "unknown_phase",
            Error::UnknownStatus(_) => "unknown_status",
            Error::UnknownOutcome(_) => "unknown_outcome",
            Error::UnknownFormat(_) => "unknown_format",
            Error::MissingContent { .. } => "missing_content",
            Error::NonStringContent { .. } => "non_string_content",
            Error::Json(_) => "json",
        }
    }
}
