//! Configuration loading for the testreport CLI.
//!
//! Resolution order (highest to lowest priority):
//! 1. Explicit CLI flags (via [`ReportOverrides`])
//! 2. An explicit config file (`--config` or `TESTREPORT_CONFIG`)
//! 3. `testreport.toml` in the search directory
//! 4. Built-in defaults
//!
//! The merged [`ReportConfig`] is validated before it is returned, so a
//! missing stylesheet or a bad redaction pattern fails before any event is
//! read.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tr_report::{ReportConfig, ReportError};

/// File name looked up in the search directory.
pub const CONFIG_FILE_NAME: &str = "testreport.toml";

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Invalid TOML in config file {}: {source}", path.display())]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("I/O error reading {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Invalid(#[from] ReportError),
}

/// Where the file layer of the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named with `--config` or `TESTREPORT_CONFIG`.
    Explicit(PathBuf),
    /// Found as `testreport.toml` in the search directory.
    Discovered(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Explicit(p) | ConfigSource::Discovered(p) => Some(p),
            ConfigSource::Defaults => None,
        }
    }
}

/// Per-field overrides from the command line. `None` leaves the file value.
#[derive(Debug, Clone, Default)]
pub struct ReportOverrides {
    pub htmlpath: Option<PathBuf>,
    pub self_contained_html: Option<bool>,
    /// Appended to the file's list.
    pub css: Vec<PathBuf>,
    pub render_collapsed: Option<String>,
    pub max_asset_filename_length: Option<usize>,
    /// Appended to the file's list.
    pub environment_table_redact_list: Vec<String>,
    pub generate_report_on_test: Option<bool>,
    pub initial_sort: Option<String>,
    pub title: Option<String>,
}

impl ReportOverrides {
    /// Apply these overrides on top of `config`.
    pub fn apply(self, mut config: ReportConfig) -> ReportConfig {
        if let Some(path) = self.htmlpath {
            config.htmlpath = path;
        }
        if let Some(flag) = self.self_contained_html {
            config.self_contained_html = flag;
        }
        config.css.extend(self.css);
        if let Some(value) = self.render_collapsed {
            config.render_collapsed = value;
        }
        if let Some(length) = self.max_asset_filename_length {
            config.max_asset_filename_length = length;
        }
        config
            .environment_table_redact_list
            .extend(self.environment_table_redact_list);
        if let Some(flag) = self.generate_report_on_test {
            config.generate_report_on_test = flag;
        }
        if let Some(sort) = self.initial_sort {
            config.initial_sort = sort;
        }
        if self.title.is_some() {
            config.title = self.title;
        }
        config
    }
}

/// Configuration resolution options.
#[derive(Debug, Default)]
pub struct ConfigOptions {
    /// Explicit config file (highest file priority).
    pub config_path: Option<PathBuf>,
    /// Directory searched for `testreport.toml`; defaults to the current one.
    pub search_dir: Option<PathBuf>,
    pub overrides: ReportOverrides,
}

/// Resolved configuration with provenance.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub report: ReportConfig,
    pub source: ConfigSource,
}

/// Load, merge and validate the report configuration.
pub fn load_config(options: ConfigOptions) -> Result<ResolvedConfig, ConfigError> {
    let (file_config, source) = match &options.config_path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound { path: path.clone() });
            }
            (load_config_file(path)?, ConfigSource::Explicit(path.clone()))
        }
        None => {
            let dir = options
                .search_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("."));
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                (load_config_file(&candidate)?, ConfigSource::Discovered(candidate))
            } else {
                (ReportConfig::default(), ConfigSource::Defaults)
            }
        }
    };

    let report = options.overrides.apply(file_config);
    report.validate()?;

    tracing::debug!(
        source = ?source.path(),
        htmlpath = %report.htmlpath.display(),
        self_contained = report.self_contained_html,
        "Configuration resolved"
    );
    Ok(ResolvedConfig { report, source })
}

/// Parse a TOML config file without validating it.
pub fn load_config_file(path: &Path) -> Result<ReportConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })
}
