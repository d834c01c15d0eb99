//! Top-level error for CLI commands and its exit code mapping.

use crate::adapter::AdapterError;
use crate::config::ConfigError;
use crate::exit_codes::ExitCode;
use std::path::PathBuf;
use thiserror::Error;
use tr_report::ReportError;

/// Any failure a CLI command can report.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("cannot open input {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown schema type: {0}")]
    UnknownSchema(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Config(_) => ExitCode::ConfigError,
            CliError::Adapter(AdapterError::Report(e)) | CliError::Report(e) => report_exit_code(e),
            CliError::Adapter(e) if e.is_input_error() => ExitCode::InputError,
            CliError::Adapter(_) => ExitCode::IoError,
            CliError::Input { .. } | CliError::UnknownSchema(_) => ExitCode::ArgsError,
            CliError::Json(_) => ExitCode::InternalError,
        }
    }
}

fn report_exit_code(error: &ReportError) -> ExitCode {
    match error {
        e if e.is_config_error() => ExitCode::ConfigError,
        ReportError::Model(_) => ExitCode::InputError,
        ReportError::Write { .. } | ReportError::IoError(_) => ExitCode::IoError,
        _ => ExitCode::InternalError,
    }
}
