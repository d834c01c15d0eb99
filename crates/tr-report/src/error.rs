//! Error types for report generation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors that can occur while building or writing a report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// User stylesheets listed in the configuration do not exist.
    #[error("Missing CSS file{}: {}", plural(.paths), join_paths(.paths))]
    MissingCss { paths: Vec<PathBuf> },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Redaction pattern error.
    #[error(transparent)]
    Redaction(#[from] tr_redact::RedactionError),

    /// Malformed input at the event boundary.
    #[error(transparent)]
    Model(#[from] tr_common::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Writing the report or one of its assets failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ReportError {
    /// Whether this error stems from configuration rather than the run itself.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ReportError::MissingCss { .. }
                | ReportError::InvalidConfig(_)
                | ReportError::Redaction(_)
        )
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Write {
            path: path.into(),
            source,
        }
    }
}

fn plural(paths: &[PathBuf]) -> &'static str {
    if paths.len() > 1 {
        "s"
    } else {
        ""
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_classified() {
        let missing = ReportError::MissingCss {
            paths: vec![PathBuf::from("extra.css")],
        };
        assert!(missing.is_config_error());
        assert_eq!(missing.to_string(), "Missing CSS file: extra.css");

        let missing = ReportError::MissingCss {
            paths: vec![PathBuf::from("a.css"), PathBuf::from("b.css")],
        };
        assert_eq!(missing.to_string(), "Missing CSS files: a.css, b.css");

        let io = ReportError::write(
            "out/report.html",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!io.is_config_error());
        assert!(io.to_string().starts_with("failed to write out/report.html"));
    }
}
