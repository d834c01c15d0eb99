//! Error types for environment redaction.

use thiserror::Error;

/// Result type for redaction operations.
pub type Result<T> = std::result::Result<T, RedactionError>;

/// Errors that can occur while building a redactor.
#[derive(Error, Debug)]
pub enum RedactionError {
    /// A configured key pattern is not a valid regular expression.
    #[error("invalid redaction pattern {pattern:?}: {source}")]
    PatternError {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl RedactionError {
    /// The offending pattern, if this error came from compiling one.
    pub fn pattern(&self) -> Option<&str> {
        match self {
            RedactionError::PatternError { pattern, .. } => Some(pattern),
        }
    }
}
