//! Phase events: one per runner callback invocation.
//!
//! A runner reports each test in up to three phases (setup, call, teardown),
//! and reports collection failures separately. A [`PhaseEvent`] is the
//! normalized, statically typed form of one such report.

use crate::{Attachment, Error};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle stage of a single test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Fixture setup before the test body.
    Setup,
    /// The test body itself.
    Call,
    /// Fixture teardown after the test body.
    Teardown,
    /// Collection of the test item.
    Collect,
}

impl Phase {
    /// All phases in lifecycle order.
    pub const ALL: [Phase; 4] = [Phase::Collect, Phase::Setup, Phase::Call, Phase::Teardown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Call => "call",
            Phase::Teardown => "teardown",
            Phase::Collect => "collect",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "setup" => Ok(Phase::Setup),
            "call" => Ok(Phase::Call),
            "teardown" => Ok(Phase::Teardown),
            "collect" => Ok(Phase::Collect),
            other => Err(Error::UnknownPhase(other.to_string())),
        }
    }
}

/// Raw pass/fail/skip signal of a single phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Failed,
    Skipped,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Passed => "passed",
            Status::Failed => "failed",
            Status::Skipped => "skipped",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passed" => Ok(Status::Passed),
            "failed" => Ok(Status::Failed),
            "skipped" => Ok(Status::Skipped),
            other => Err(Error::UnknownStatus(other.to_string())),
        }
    }
}

/// One captured output section (stdout, stderr, logging) of a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LogSection {
    /// Section header, e.g. `Captured stdout call`.
    pub header: String,
    /// Captured text.
    pub body: String,
}

impl LogSection {
    pub fn new(header: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            body: body.into(),
        }
    }
}

/// A single normalized runner report for one phase of one test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PhaseEvent {
    /// Stable identifier of the logical test, e.g. `tests/test_a.py::test_b`.
    /// Non-call phases may carry a `::setup` / `::teardown` suffix.
    pub test_id: String,
    /// Lifecycle stage this event reports.
    pub phase: Phase,
    /// Raw outcome of the phase.
    pub status: Status,
    /// Phase duration in seconds.
    #[serde(default)]
    pub duration: f64,
    /// The result was marked as expected to fail.
    #[serde(default)]
    pub is_xfail: bool,
    /// Attempts so far; present only when the runner is about to retry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rerun_index: Option<u32>,
    /// Attachments in insertion order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    /// Captured output sections in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub log_sections: Vec<LogSection>,
    /// Failure text (traceback), present for failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_representation: Option<String>,
}

impl PhaseEvent {
    /// Create an event with no duration, log or attachments.
    pub fn new(test_id: impl Into<String>, phase: Phase, status: Status) -> Self {
        Self {
            test_id: test_id.into(),
            phase,
            status,
            duration: 0.0,
            is_xfail: false,
            rerun_index: None,
            attachments: Vec::new(),
            log_sections: Vec::new(),
            long_representation: None,
        }
    }

    /// Set the duration; negative or non-finite values clamp to zero.
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = sanitize_duration(seconds);
        self
    }

    pub fn with_xfail(mut self, is_xfail: bool) -> Self {
        self.is_xfail = is_xfail;
        self
    }

    /// Mark this event as a rerun attempt.
    pub fn with_rerun(mut self, attempts_so_far: u32) -> Self {
        self.rerun_index = Some(attempts_so_far);
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_section(mut self, header: impl Into<String>, body: impl Into<String>) -> Self {
        self.log_sections.push(LogSection::new(header, body));
        self
    }

    pub fn with_long_representation(mut self, text: impl Into<String>) -> Self {
        self.long_representation = Some(text.into());
        self
    }

    /// Whether the runner will retry the test after this event.
    pub fn is_rerun(&self) -> bool {
        self.rerun_index.is_some()
    }
}

/// Clamp a reported duration into the non-negative finite range.
pub fn sanitize_duration(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}
