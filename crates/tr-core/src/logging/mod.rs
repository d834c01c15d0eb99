//! Logging setup for the testreport binary.
//!
//! Library crates only emit `tracing` events; this module installs the
//! subscriber. stdout is reserved for command payloads, so every log line,
//! human or JSONL, goes to stderr.

pub mod config;

pub use config::{LogConfig, LogFormat, LogLevel};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global subscriber.
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_new(config.filter_directive())
        .unwrap_or_else(|_| EnvFilter::new(LogConfig::default().filter_directive()));

    let result = match config.format {
        LogFormat::Human => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal());
            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer)
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.without_time())
                    .try_init()
            }
        }
        LogFormat::Jsonl => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    // Already installed (tests, embedding); keep the existing subscriber.
    let _ = result;
}

/// Generate a unique run ID for this invocation.
pub fn generate_run_id() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("run-{}", &uuid[..12])
}
