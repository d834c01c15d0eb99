//! In-memory report state for one run.
//!
//! The model only grows: records are appended, counts only increase and the
//! running state only moves forward. [`ReportModel::snapshot`] produces the
//! serializable view handed to the renderer and embedded in the page.

use crate::codec::RenderedExtra;
use crate::table::{format_duration, TableRow};
use crate::ReportError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;
use tracing::{debug, warn};
use tr_common::event::sanitize_duration;
use tr_common::{Outcome, Phase};

/// Lifecycle of the run as shown in the report header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunningState {
    #[default]
    NotStarted,
    Started,
    Finished,
}

/// HTML fragments shown around the summary section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalSummary {
    pub prefix: Vec<String>,
    pub summary: Vec<String>,
    pub postfix: Vec<String>,
}

impl AdditionalSummary {
    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty() && self.summary.is_empty() && self.postfix.is_empty()
    }
}

/// Column the results table is ordered by when the page opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InitialSort {
    /// Most severe outcome first.
    #[default]
    Result,
    TestId,
    /// Slowest first.
    Duration,
    /// Arrival order.
    Original,
}

impl InitialSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            InitialSort::Result => "result",
            InitialSort::TestId => "testId",
            InitialSort::Duration => "duration",
            InitialSort::Original => "original",
        }
    }
}

impl FromStr for InitialSort {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "result" => Ok(InitialSort::Result),
            "testId" => Ok(InitialSort::TestId),
            "duration" => Ok(InitialSort::Duration),
            "original" => Ok(InitialSort::Original),
            other => Err(ReportError::InvalidConfig(format!(
                "initial_sort must be one of result, testId, duration, original; got {other:?}"
            ))),
        }
    }
}

/// Outcome keys whose rows start collapsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderCollapsed(Vec<String>);

impl RenderCollapsed {
    pub const ALL: &'static str = "all";

    /// Parse a comma separated list; `true` is a deprecated alias of `all`.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("true") {
            warn!("render_collapsed = true is deprecated; use render_collapsed = all");
            return Self::all();
        }
        RenderCollapsed(
            value
                .split(',')
                .map(|key| key.trim().to_lowercase())
                .filter(|key| !key.is_empty())
                .collect(),
        )
    }

    pub fn all() -> Self {
        RenderCollapsed(vec![Self::ALL.to_string()])
    }

    pub fn none() -> Self {
        RenderCollapsed(Vec::new())
    }

    pub fn keys(&self) -> &[String] {
        &self.0
    }

    /// Whether rows with this outcome start collapsed.
    pub fn collapses(&self, outcome: Outcome) -> bool {
        self.0.iter().any(|k| k == Self::ALL || k == outcome.key())
    }
}

impl Default for RenderCollapsed {
    fn default() -> Self {
        RenderCollapsed(vec![Outcome::Passed.key().to_string()])
    }
}

/// One row of the results table with everything needed to render it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Displayed id; errors carry their phase suffix.
    pub test_id: String,
    /// Base id shared by all records of the test.
    pub base_id: String,
    pub phase: Phase,
    pub attempt: u32,
    pub result: Outcome,
    pub duration: f64,
    pub extras: Vec<RenderedExtra>,
    pub results_table_row: TableRow,
    /// Raw cell content of sortable columns, by column name.
    pub sortable: IndexMap<String, String>,
    pub log: String,
}

impl TestResult {
    fn key(&self) -> (String, u32) {
        (self.test_id.clone(), self.attempt)
    }
}

/// Label and value of one outcome counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCount {
    pub label: String,
    pub value: u64,
}

/// Serializable view of the whole report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSnapshot {
    pub title: String,
    pub collected_items: u64,
    pub total_duration: f64,
    pub running_state: RunningState,
    pub environment: IndexMap<String, serde_json::Value>,
    pub outcomes: BTreeMap<Outcome, OutcomeCount>,
    /// Results grouped by base test id, in arrival order.
    pub tests: IndexMap<String, Vec<TestResult>>,
    pub additional_summary: AdditionalSummary,
    pub results_table_header: TableRow,
    pub render_collapsed: RenderCollapsed,
    pub initial_sort: InitialSort,
}

impl ReportSnapshot {
    pub fn count(&self, outcome: Outcome) -> u64 {
        self.outcomes.get(&outcome).map_or(0, |c| c.value)
    }

    /// Tests that actually ran: passed, failed, xpassed and xfailed.
    pub fn tests_ran(&self) -> u64 {
        Outcome::ALL
            .into_iter()
            .filter(Outcome::counts_as_run)
            .map(|o| self.count(o))
            .sum()
    }

    /// All results in arrival order.
    pub fn results(&self) -> impl Iterator<Item = &TestResult> {
        self.tests.values().flatten()
    }

    /// `N tests took HH:MM:SS.` once finished, `N/M tests done.` before.
    pub fn run_count_line(&self) -> String {
        let ran = self.tests_ran();
        let noun = if ran > 1 { "tests" } else { "test" };
        if self.running_state == RunningState::Finished {
            format!("{ran} {noun} took {}.", format_duration(self.total_duration))
        } else {
            format!("{ran}/{} {noun} done.", self.collected_items)
        }
    }
}

/// Mutable report state owned by a session.
#[derive(Debug, Clone)]
pub struct ReportModel {
    title: String,
    environment: IndexMap<String, serde_json::Value>,
    collected_items: u64,
    running_state: RunningState,
    outcome_counts: BTreeMap<Outcome, u64>,
    tests: Vec<TestResult>,
    seen: HashSet<(String, u32)>,
    table_header: TableRow,
    total_duration: f64,
    additional_summary: AdditionalSummary,
    render_collapsed: RenderCollapsed,
    initial_sort: InitialSort,
}

impl ReportModel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            environment: IndexMap::new(),
            collected_items: 0,
            running_state: RunningState::NotStarted,
            outcome_counts: Outcome::ALL.into_iter().map(|o| (o, 0)).collect(),
            tests: Vec::new(),
            seen: HashSet::new(),
            table_header: TableRow::default_header(),
            total_duration: 0.0,
            additional_summary: AdditionalSummary::default(),
            render_collapsed: RenderCollapsed::default(),
            initial_sort: InitialSort::default(),
        }
    }

    pub fn with_render_collapsed(mut self, render_collapsed: RenderCollapsed) -> Self {
        self.render_collapsed = render_collapsed;
        self
    }

    pub fn with_initial_sort(mut self, initial_sort: InitialSort) -> Self {
        self.initial_sort = initial_sort;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Replace the environment table. Values must already be redacted.
    pub fn set_environment(&mut self, environment: IndexMap<String, serde_json::Value>) {
        self.environment = environment;
    }

    pub fn set_collected_items(&mut self, collected: u64) {
        self.collected_items = collected;
    }

    pub fn table_header(&self) -> &TableRow {
        &self.table_header
    }

    pub fn set_table_header(&mut self, header: TableRow) {
        self.table_header = header;
    }

    pub fn additional_summary(&self) -> &AdditionalSummary {
        &self.additional_summary
    }

    pub fn set_additional_summary(&mut self, summary: AdditionalSummary) {
        self.additional_summary = summary;
    }

    pub fn running_state(&self) -> RunningState {
        self.running_state
    }

    /// Advance the running state; moving backwards is ignored.
    pub fn mark_running_state(&mut self, state: RunningState) {
        if state < self.running_state {
            warn!(current = ?self.running_state, requested = ?state, "Ignoring running state regression");
            return;
        }
        self.running_state = state;
    }

    /// Add a phase duration to the run total.
    pub fn add_duration(&mut self, seconds: f64) {
        self.total_duration += sanitize_duration(seconds);
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn outcome_count(&self, outcome: Outcome) -> u64 {
        self.outcome_counts.get(&outcome).copied().unwrap_or(0)
    }

    pub fn tests(&self) -> &[TestResult] {
        &self.tests
    }

    /// Append a result and count its outcome.
    ///
    /// A second result for the same displayed id and attempt is dropped, so
    /// counts always match the retained rows. Returns whether it was kept.
    pub fn append_record(&mut self, result: TestResult) -> bool {
        if !self.seen.insert(result.key()) {
            warn!(
                test_id = %result.test_id,
                attempt = result.attempt,
                "Dropping duplicate result"
            );
            return false;
        }
        self.increment_outcome(result.result);
        debug!(test_id = %result.test_id, outcome = %result.result, "Appended result");
        self.tests.push(result);
        true
    }

    fn increment_outcome(&mut self, outcome: Outcome) {
        *self.outcome_counts.entry(outcome).or_insert(0) += 1;
    }

    /// Full serializable state. Calling it twice without mutation in between
    /// yields equal snapshots.
    pub fn snapshot(&self) -> ReportSnapshot {
        let outcomes = self
            .outcome_counts
            .iter()
            .map(|(outcome, value)| {
                let count = OutcomeCount {
                    label: outcome.summary_label().to_string(),
                    value: *value,
                };
                (*outcome, count)
            })
            .collect();

        let mut tests: IndexMap<String, Vec<TestResult>> = IndexMap::new();
        for result in &self.tests {
            tests
                .entry(result.base_id.clone())
                .or_default()
                .push(result.clone());
        }

        ReportSnapshot {
            title: self.title.clone(),
            collected_items: self.collected_items,
            total_duration: self.total_duration,
            running_state: self.running_state,
            environment: self.environment.clone(),
            outcomes,
            tests,
            additional_summary: self.additional_summary.clone(),
            results_table_header: self.table_header.clone(),
            render_collapsed: self.render_collapsed.clone(),
            initial_sort: self.initial_sort,
        }
    }
}
