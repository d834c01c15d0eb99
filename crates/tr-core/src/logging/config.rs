//! Logging configuration.
//!
//! Sources, lowest to highest priority:
//! - `RUST_LOG` (used verbatim as the filter directive)
//! - `TESTREPORT_LOG` and `TESTREPORT_LOG_FORMAT`
//! - `-v`/`-q` flags

use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;

pub const LOG_LEVEL_ENV: &str = "TESTREPORT_LOG";
pub const LOG_FORMAT_ENV: &str = "TESTREPORT_LOG_FORMAT";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines on stderr.
    #[default]
    Human,
    /// One JSON object per line on stderr.
    Jsonl,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "pretty" | "text" => Ok(LogFormat::Human),
            "jsonl" | "json" => Ok(LogFormat::Jsonl),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Human => "human",
            LogFormat::Jsonl => "jsonl",
        })
    }
}

/// Minimum level emitted by the testreport crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// Level implied by `-v`/`-q`; `None` when neither flag was given.
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Option<Self> {
        if quiet {
            return Some(LogLevel::Error);
        }
        match verbose {
            0 => None,
            1 => Some(LogLevel::Info),
            2 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" | "quiet" => Ok(LogLevel::Off),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        })
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Raw `RUST_LOG` directive; wins over `level` when set.
    pub directive: Option<String>,
    /// Include timestamps in human output.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Human,
            level: LogLevel::Warn,
            directive: None,
            timestamps: false,
        }
    }
}

impl LogConfig {
    /// Build from the process environment plus CLI overrides.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), cli_level, cli_format)
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F, cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = LogConfig::default();

        if let Some(level) = lookup(LOG_LEVEL_ENV).and_then(|v| v.parse().ok()) {
            config.level = level;
        } else {
            config.directive = lookup("RUST_LOG").filter(|v| !v.trim().is_empty());
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV).and_then(|v| v.parse().ok()) {
            config.format = format;
        }

        if let Some(level) = cli_level {
            config.level = level;
            config.directive = None;
        }
        if let Some(format) = cli_format {
            config.format = format;
        }
        config
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    /// Filter directive covering every testreport crate.
    pub fn filter_directive(&self) -> String {
        if let Some(directive) = &self.directive {
            return directive.clone();
        }
        let level = self.level;
        format!("tr_core={level},tr_report={level},tr_redact={level},tr_common={level}")
    }
}
