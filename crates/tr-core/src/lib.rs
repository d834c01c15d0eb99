//! testreport core library
//!
//! Front end for the report pipeline in `tr-report`:
//! - Runner stream adapter (JSON lines to phase events)
//! - Configuration loading (TOML file plus CLI overrides)
//! - Exit codes and error mapping for the CLI
//! - Logging setup
//! - JSON Schema for the runner wire format
//!
//! The binary entry point is in `main.rs`.

pub mod adapter;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod schema;

pub use adapter::{drive, RunnerMessage, RunnerReport};
pub use error::CliError;
pub use exit_codes::ExitCode;
