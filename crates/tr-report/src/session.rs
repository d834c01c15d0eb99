//! One report run: configuration, state and output, wired together.
//!
//! A [`ReportSession`] is the context object every stage receives. It owns
//! the model, the aggregator, the attachment codec, the redactor and the
//! hooks, and it is the only component that touches the filesystem besides
//! the codec.

use crate::aggregator::{OutcomeRecord, TestRecordAggregator};
use crate::codec::{AssetMode, AttachmentCodec, ASSETS_DIR};
use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::generator::{ReportGenerator, DEFAULT_STYLES};
use crate::hooks::{NoopHooks, ReportHooks};
use crate::model::{AdditionalSummary, ReportModel, RunningState, TestResult};
use crate::table::{default_row, extract_sortable, format_duration, TableRow, TableRowBuilder};
use chrono::Utc;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tr_common::{Outcome, PhaseEvent};
use tr_redact::EnvironmentRedactor;

/// What a finished session produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub report: PathBuf,
    pub title: String,
    pub self_contained: bool,
    pub collected: u64,
    pub tests_ran: u64,
    pub total_duration: f64,
    pub outcomes: BTreeMap<Outcome, u64>,
}

/// Drives one report from session start to finish.
pub struct ReportSession {
    config: ReportConfig,
    report_path: PathBuf,
    model: ReportModel,
    aggregator: TestRecordAggregator,
    codec: AttachmentCodec,
    redactor: EnvironmentRedactor,
    generator: ReportGenerator,
    hooks: Box<dyn ReportHooks>,
}

impl ReportSession {
    /// Validate the configuration and prepare an empty report.
    ///
    /// Fails on configuration errors before any event is seen.
    pub fn new(config: ReportConfig) -> Result<Self> {
        config.validate()?;

        let report_path = config.htmlpath.clone();
        let mode = if config.self_contained_html {
            AssetMode::SelfContained
        } else {
            AssetMode::Linked {
                report_dir: config.report_dir().to_path_buf(),
            }
        };
        let codec = AttachmentCodec::new(mode, config.max_asset_filename_length);
        let generator = ReportGenerator::new(load_styles(&config.css)?, config.self_contained_html);
        let model = ReportModel::new(config.default_title())
            .with_render_collapsed(config.parsed_render_collapsed())
            .with_initial_sort(config.parsed_initial_sort()?);

        debug!(
            report = %report_path.display(),
            self_contained = config.self_contained_html,
            "Report session created"
        );

        Ok(Self {
            redactor: config.redactor()?,
            config,
            report_path,
            model,
            aggregator: TestRecordAggregator::new(),
            codec,
            generator,
            hooks: Box::new(NoopHooks),
        })
    }

    /// Install report hooks.
    pub fn with_hooks(mut self, hooks: impl ReportHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    pub fn model(&self) -> &ReportModel {
        &self.model
    }

    /// Record the environment, settle title and header, and write the
    /// initial report.
    pub fn session_start(
        &mut self,
        environment: IndexMap<String, serde_json::Value>,
        title: Option<String>,
    ) -> Result<()> {
        self.model.set_environment(self.redactor.redact(&environment));

        let title = self
            .config
            .title
            .clone()
            .or(title)
            .unwrap_or_else(|| self.config.default_title());
        let title = self.hooks.report_title(&title).unwrap_or(title);
        self.model.set_title(title);

        let mut header = TableRowBuilder::from_row(&TableRow::default_header());
        self.hooks.results_table_header(&mut header);
        self.model
            .set_table_header(header.finalize().unwrap_or_default());

        self.model.mark_running_state(RunningState::Started);
        self.write_report()
    }

    pub fn set_collected(&mut self, collected: u64) {
        self.model.set_collected_items(collected);
    }

    /// Feed one phase event. Returns how many results were added.
    pub fn handle_event(&mut self, event: PhaseEvent) -> Result<usize> {
        self.model.add_duration(event.duration);

        let completed = self.aggregator.ingest(event);
        let mut records = self.aggregator.take_displaced();
        records.extend(completed);

        let added = self.append_records(records)?;
        if added > 0 && self.config.generate_report_on_test {
            self.write_report()?;
        }
        Ok(added)
    }

    /// Flush pending tests, collect summary fragments and write the final
    /// report.
    pub fn session_finish(&mut self) -> Result<SessionSummary> {
        let leftovers = self.aggregator.finish();
        self.append_records(leftovers)?;

        let mut summary = AdditionalSummary::default();
        self.hooks.results_summary(&mut summary);
        self.model.set_additional_summary(summary);

        self.model.mark_running_state(RunningState::Finished);
        self.write_report()?;

        let summary = self.summary();
        info!(
            report = %summary.report.display(),
            tests = summary.tests_ran,
            "Report written"
        );
        Ok(summary)
    }

    /// Counts and location of the report as it stands.
    pub fn summary(&self) -> SessionSummary {
        let snapshot = self.model.snapshot();
        SessionSummary {
            report: self.report_path.clone(),
            title: snapshot.title.clone(),
            self_contained: self.config.self_contained_html,
            collected: snapshot.collected_items,
            tests_ran: snapshot.tests_ran(),
            total_duration: snapshot.total_duration,
            outcomes: Outcome::ALL
                .into_iter()
                .map(|o| (o, snapshot.count(o)))
                .collect(),
        }
    }

    /// Render the current state and write it to the report path.
    pub fn write_report(&self) -> Result<()> {
        if let Some(parent) = self.report_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ReportError::write(parent, e))?;
        }

        if !self.generator.self_contained() {
            let assets = self.config.report_dir().join(ASSETS_DIR);
            fs::create_dir_all(&assets).map_err(|e| ReportError::write(&assets, e))?;
            let stylesheet = assets.join("style.css");
            fs::write(&stylesheet, self.generator.styles())
                .map_err(|e| ReportError::write(&stylesheet, e))?;
        }

        let html = self.generator.render(&self.model.snapshot(), Utc::now());
        fs::write(&self.report_path, html).map_err(|e| ReportError::write(&self.report_path, e))
    }

    fn append_records(&mut self, records: Vec<OutcomeRecord>) -> Result<usize> {
        let mut added = 0;
        for record in records {
            if let Some(result) = self.build_result(&record)? {
                if self.model.append_record(result) {
                    added += 1;
                }
            }
        }
        Ok(added)
    }

    /// Turn a record into a table entry. `None` when a hook removed the row.
    fn build_result(&self, record: &OutcomeRecord) -> Result<Option<TestResult>> {
        let display_id = record.display_id();
        let extras = self
            .codec
            .encode_all(&record.attachments, &display_id, record.attempt)?;

        let duration = self
            .hooks
            .duration_format(record.duration)
            .unwrap_or_else(|| format_duration(record.duration));
        let mut row = default_row(record.outcome, &display_id, &duration, &extras);
        self.hooks.results_table_row(record, &mut row);
        let Some(row) = row.finalize() else {
            debug!(test_id = %display_id, "Row removed by hook");
            return Ok(None);
        };

        let mut log: Vec<String> = record.log.split('\n').map(str::to_string).collect();
        self.hooks.results_table_html(record, &mut log);

        Ok(Some(TestResult {
            sortable: extract_sortable(self.model.table_header(), &row),
            test_id: display_id,
            base_id: record.test_id.clone(),
            phase: record.phase,
            attempt: record.attempt,
            result: record.outcome,
            duration: record.duration,
            extras,
            results_table_row: row,
            log: log.join("\n"),
        }))
    }
}

/// Built-in stylesheet followed by every user stylesheet.
fn load_styles(css: &[PathBuf]) -> Result<String> {
    let mut styles = DEFAULT_STYLES.to_string();
    for path in css {
        let extra = fs::read_to_string(path).map_err(|_| ReportError::MissingCss {
            paths: vec![path.clone()],
        })?;
        styles.push('\n');
        styles.push_str(&extra);
    }
    Ok(styles)
}
