//! Report configuration types.

use crate::codec::DEFAULT_MAX_ASSET_FILENAME_LENGTH;
use crate::error::{ReportError, Result};
use crate::model::{InitialSort, RenderCollapsed};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tr_redact::EnvironmentRedactor;

/// Complete report configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Output path of the HTML file.
    #[serde(default = "default_htmlpath")]
    pub htmlpath: PathBuf,
    /// Inline every asset instead of writing an `assets/` directory.
    #[serde(default)]
    pub self_contained_html: bool,
    /// Extra stylesheets appended to the built-in one.
    #[serde(default)]
    pub css: Vec<PathBuf>,
    /// Comma separated outcome keys whose rows start collapsed, or `all`.
    #[serde(default = "default_render_collapsed")]
    pub render_collapsed: String,
    /// Upper bound for asset file names in linked mode.
    #[serde(default = "default_max_asset_filename_length")]
    pub max_asset_filename_length: usize,
    /// Regexes matched against environment keys; matching values are masked.
    #[serde(default)]
    pub environment_table_redact_list: Vec<String>,
    /// Rewrite the report after every finished test.
    #[serde(default)]
    pub generate_report_on_test: bool,
    /// Initial ordering of the results table.
    #[serde(default = "default_initial_sort")]
    pub initial_sort: String,
    /// Custom report title; defaults to the report file name.
    #[serde(default)]
    pub title: Option<String>,
}

fn default_htmlpath() -> PathBuf {
    PathBuf::from("report.html")
}

fn default_render_collapsed() -> String {
    "passed".to_string()
}

fn default_max_asset_filename_length() -> usize {
    DEFAULT_MAX_ASSET_FILENAME_LENGTH
}

fn default_initial_sort() -> String {
    InitialSort::default().as_str().to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            htmlpath: default_htmlpath(),
            self_contained_html: false,
            css: Vec::new(),
            render_collapsed: default_render_collapsed(),
            max_asset_filename_length: default_max_asset_filename_length(),
            environment_table_redact_list: Vec::new(),
            generate_report_on_test: false,
            initial_sort: default_initial_sort(),
            title: None,
        }
    }
}

impl ReportConfig {
    /// Create a new report configuration.
    pub fn new(htmlpath: impl Into<PathBuf>) -> Self {
        Self {
            htmlpath: htmlpath.into(),
            ..Self::default()
        }
    }

    pub fn with_self_contained(mut self, self_contained: bool) -> Self {
        self.self_contained_html = self_contained;
        self
    }

    pub fn with_css(mut self, path: impl Into<PathBuf>) -> Self {
        self.css.push(path.into());
        self
    }

    pub fn with_render_collapsed(mut self, value: impl Into<String>) -> Self {
        self.render_collapsed = value.into();
        self
    }

    pub fn with_max_asset_filename_length(mut self, length: usize) -> Self {
        self.max_asset_filename_length = length;
        self
    }

    pub fn with_redact_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.environment_table_redact_list.push(pattern.into());
        self
    }

    pub fn with_generate_report_on_test(mut self, enabled: bool) -> Self {
        self.generate_report_on_test = enabled;
        self
    }

    pub fn with_initial_sort(mut self, sort: impl Into<String>) -> Self {
        self.initial_sort = sort.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Title used when none is configured: the report's file name.
    pub fn default_title(&self) -> String {
        self.htmlpath
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report.html".to_string())
    }

    /// Directory the report and its assets are written to.
    pub fn report_dir(&self) -> &Path {
        match self.htmlpath.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    pub fn parsed_render_collapsed(&self) -> RenderCollapsed {
        RenderCollapsed::parse(&self.render_collapsed)
    }

    pub fn parsed_initial_sort(&self) -> Result<InitialSort> {
        self.initial_sort.parse()
    }

    /// Build the redactor for the configured pattern list.
    pub fn redactor(&self) -> Result<EnvironmentRedactor> {
        Ok(EnvironmentRedactor::new(&self.environment_table_redact_list)?)
    }

    /// Check everything that must hold before the first event is processed.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<PathBuf> = self.css.iter().filter(|p| !p.is_file()).cloned().collect();
        if !missing.is_empty() {
            return Err(ReportError::MissingCss { paths: missing });
        }
        if self.max_asset_filename_length == 0 {
            return Err(ReportError::InvalidConfig(
                "max_asset_filename_length must be at least 1".to_string(),
            ));
        }
        if self.htmlpath.as_os_str().is_empty() {
            return Err(ReportError::InvalidConfig("htmlpath is empty".to_string()));
        }
        self.parsed_initial_sort()?;
        self.redactor()?;
        Ok(())
    }

    /// Load configuration from JSON.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
