//! Extension points for customizing the report.
//!
//! Every method has a no-op default, so an implementation only overrides
//! what it needs. Hooks receive builders, never live report state.

use crate::aggregator::OutcomeRecord;
use crate::model::AdditionalSummary;
use crate::table::TableRowBuilder;

/// Customizations applied while a report is being built.
pub trait ReportHooks {
    /// Replace the report title. Called once at session start.
    fn report_title(&self, _current: &str) -> Option<String> {
        None
    }

    /// Reshape the results table header. Called once at session start.
    fn results_table_header(&self, _header: &mut TableRowBuilder) {}

    /// Reshape one result row. Clearing every cell removes the row.
    fn results_table_row(&self, _record: &OutcomeRecord, _row: &mut TableRowBuilder) {}

    /// Edit the log lines shown below a result.
    fn results_table_html(&self, _record: &OutcomeRecord, _log: &mut Vec<String>) {}

    /// Add HTML fragments around the summary. Called once at session end.
    fn results_summary(&self, _summary: &mut AdditionalSummary) {}

    /// Format a duration for the Duration column; `None` keeps the default.
    fn duration_format(&self, _seconds: f64) -> Option<String> {
        None
    }
}

/// Hooks that change nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl ReportHooks for NoopHooks {}

/// Runs several hook sets in order.
///
/// For hooks returning a value the first `Some` wins.
#[derive(Default)]
pub struct HookChain {
    hooks: Vec<Box<dyn ReportHooks>>,
}

impl HookChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, hooks: impl ReportHooks + 'static) -> Self {
        self.hooks.push(Box::new(hooks));
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl ReportHooks for HookChain {
    fn report_title(&self, current: &str) -> Option<String> {
        self.hooks.iter().find_map(|h| h.report_title(current))
    }

    fn results_table_header(&self, header: &mut TableRowBuilder) {
        for hooks in &self.hooks {
            hooks.results_table_header(header);
        }
    }

    fn results_table_row(&self, record: &OutcomeRecord, row: &mut TableRowBuilder) {
        for hooks in &self.hooks {
            hooks.results_table_row(record, row);
        }
    }

    fn results_table_html(&self, record: &OutcomeRecord, log: &mut Vec<String>) {
        for hooks in &self.hooks {
            hooks.results_table_html(record, log);
        }
    }

    fn results_summary(&self, summary: &mut AdditionalSummary) {
        for hooks in &self.hooks {
            hooks.results_summary(summary);
        }
    }

    fn duration_format(&self, seconds: f64) -> Option<String> {
        self.hooks.iter().find_map(|h| h.duration_format(seconds))
    }
}
