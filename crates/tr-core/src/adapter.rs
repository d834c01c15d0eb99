//! Runner stream adapter.
//!
//! A test runner plugin writes one JSON object per line, tagged by `type`.
//! Report messages mirror the runner's report objects, whose optional
//! attributes (`wasxfail`, `rerun`, `longrepr`) may or may not be present.
//! This module is the only place that knows about that shape: it turns each
//! report into a [`PhaseEvent`] and drives a [`ReportSession`] with them.

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::BufRead;
use thiserror::Error;
use tracing::{debug, warn};
use tr_common::{Attachment, ExtraSpec, Phase, PhaseEvent, Status};
use tr_report::{ReportError, ReportSession, SessionSummary};

/// One line of the runner stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunnerMessage {
    /// The session began; carries the environment table.
    SessionStart {
        #[serde(default)]
        environment: IndexMap<String, serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    /// Collection is done.
    CollectionFinish { collected: u64 },
    /// One phase of one test finished.
    Report(RunnerReport),
    /// The session ended.
    SessionFinish,
}

/// Outcome as reported by the runner. `rerun` comes from rerun plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RunnerOutcome {
    Passed,
    Failed,
    Skipped,
    Rerun,
}

/// A runner report for one phase of one test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunnerReport {
    /// Test node id, e.g. `tests/test_a.py::test_b[param]`.
    pub nodeid: String,
    pub when: Phase,
    pub outcome: RunnerOutcome,
    #[serde(default)]
    pub duration: f64,
    /// Failure text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longrepr: Option<String>,
    /// Captured output as `[header, body]` pairs; may include earlier phases.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<(String, String)>,
    /// Present (possibly empty) when the test was expected to fail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wasxfail: Option<String>,
    /// Attempts so far, set by rerun plugins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rerun: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<ExtraSpec>,
}

/// Errors reading or applying the runner stream.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("line {line}: invalid runner message: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: {source}")]
    Extra {
        line: usize,
        #[source]
        source: tr_common::Error,
    },

    #[error("failed to read runner stream: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Report(#[from] ReportError),
}

impl AdapterError {
    /// Whether the input stream itself is malformed.
    pub fn is_input_error(&self) -> bool {
        matches!(self, AdapterError::Parse { .. } | AdapterError::Extra { .. })
    }
}

/// Normalize a runner report into a phase event.
pub fn to_phase_event(report: RunnerReport) -> Result<PhaseEvent, tr_common::Error> {
    let (status, rerun_index) = match report.outcome {
        RunnerOutcome::Passed => (Status::Passed, None),
        RunnerOutcome::Failed => (Status::Failed, None),
        RunnerOutcome::Skipped => (Status::Skipped, None),
        RunnerOutcome::Rerun => (Status::Failed, Some(report.rerun.unwrap_or(0))),
    };

    let mut event = PhaseEvent::new(report.nodeid, report.when, status)
        .with_duration(report.duration)
        .with_xfail(report.wasxfail.is_some());
    if let Some(done) = rerun_index {
        event = event.with_rerun(done);
    }
    if let Some(text) = report.longrepr.filter(|t| !t.is_empty()) {
        event = event.with_long_representation(text);
    }

    // Sections accumulate over the test's phases; keep only this phase's.
    let phase = report.when.as_str();
    for (header, body) in report.sections {
        if header.contains(phase) {
            event = event.with_section(header, body);
        }
    }

    for spec in report.extras {
        event = event.with_attachment(Attachment::try_from(spec)?);
    }
    Ok(event)
}

/// Parse one line. Blank lines yield `None`.
pub fn parse_line(line: usize, text: &str) -> Result<Option<RunnerMessage>, AdapterError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text)
        .map(Some)
        .map_err(|source| AdapterError::Parse { line, source })
}

/// Rerun attempts seen so far, per node id.
///
/// Fills in the attempt counter for rerun reports that omit it, so every
/// attempt of a test keeps a distinct index.
#[derive(Debug, Default)]
pub struct RerunCounter {
    seen: HashMap<String, u32>,
}

impl RerunCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `report.rerun` when it is missing and remember the attempt.
    pub fn fill(&mut self, report: &mut RunnerReport) {
        if report.outcome != RunnerOutcome::Rerun {
            return;
        }
        let next = self.seen.entry(report.nodeid.clone()).or_insert(0);
        let done = match report.rerun {
            Some(done) => done,
            None => {
                debug!(nodeid = %report.nodeid, attempt = *next, "Rerun report without counter");
                *next
            }
        };
        report.rerun = Some(done);
        *next = done.saturating_add(1);
    }
}

/// Feed a whole runner stream into a session and finish it.
///
/// A stream that ends without `session_finish` is finished anyway, and one
/// that never sent `session_start` is started with an empty environment.
pub fn drive<R: BufRead>(
    session: &mut ReportSession,
    reader: R,
) -> Result<SessionSummary, AdapterError> {
    let mut started = false;
    let mut reruns = RerunCounter::new();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let Some(message) = parse_line(line_no, &line?)? else {
            continue;
        };

        match message {
            RunnerMessage::SessionStart { environment, title } => {
                debug!(entries = environment.len(), "Session started");
                session.session_start(environment, title)?;
                started = true;
            }
            RunnerMessage::CollectionFinish { collected } => session.set_collected(collected),
            RunnerMessage::Report(mut report) => {
                ensure_started(session, &mut started, line_no)?;
                reruns.fill(&mut report);
                let event = to_phase_event(report)
                    .map_err(|source| AdapterError::Extra { line: line_no, source })?;
                session.handle_event(event)?;
            }
            RunnerMessage::SessionFinish => {
                ensure_started(session, &mut started, line_no)?;
                return Ok(session.session_finish()?);
            }
        }
    }

    warn!("Runner stream ended without session_finish");
    ensure_started(session, &mut started, 0)?;
    Ok(session.session_finish()?)
}

fn ensure_started(
    session: &mut ReportSession,
    started: &mut bool,
    line: usize,
) -> Result<(), AdapterError> {
    if !*started {
        warn!(line, "No session_start before events");
        session.session_start(IndexMap::new(), None)?;
        *started = true;
    }
    Ok(())
}
