//! Per-test lifecycle aggregation.
//!
//! A runner reports every test in up to three phases. The aggregator buffers
//! phase events per base test id and emits exactly one [`OutcomeRecord`] per
//! finished attempt:
//!
//! ```text
//! Idle ──setup(passed)──▶ AwaitingCall ──call──▶ AwaitingTeardown ──teardown──▶ emit
//!  │                                                  ▲
//!  ├──setup(skipped)──────────────────────────────────┘
//!  └──setup(failed)──▶ emit Error, SetupFailed ──teardown(passed)──▶ absorbed
//! ```
//!
//! Rerun events on any phase emit a `Rerun` record immediately and leave the
//! buffered lifecycle where it was, so the setup that preceded the reruns
//! still counts toward the final record. Collection failures never touch the
//! buffer.

use crate::log::{join_log, phase_log};
use crate::outcome::classify;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use tr_common::{base_test_id, display_test_id, Attachment, Outcome, Phase, PhaseEvent, Status};

/// One finished test attempt, ready for the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// Base test id, without phase suffix.
    pub test_id: String,
    /// Phase that determined the outcome.
    pub phase: Phase,
    /// 0 for the final attempt, `rerun_index + 1` for a rerun attempt.
    pub attempt: u32,
    pub outcome: Outcome,
    /// Seconds; the sum of every non-rerun phase of the attempt.
    pub duration: f64,
    /// Formatted, ANSI-free log text.
    pub log: String,
    /// Attachments of setup, call and teardown, in that order.
    pub attachments: Vec<Attachment>,
}

impl OutcomeRecord {
    /// Id shown in the results table; errors carry their phase.
    pub fn display_id(&self) -> String {
        display_test_id(&self.test_id, self.phase, self.outcome)
    }
}

/// Data gathered from the phases of the current attempt.
#[derive(Debug, Default)]
struct Attempt {
    duration: f64,
    log: Vec<String>,
    attachments: Vec<Attachment>,
}

impl Attempt {
    fn absorb(&mut self, event: &PhaseEvent) {
        self.duration += event.duration;
        self.log.extend(phase_log(event));
        self.attachments.extend(event.attachments.iter().cloned());
    }

    fn is_empty(&self) -> bool {
        self.duration == 0.0 && self.log.is_empty() && self.attachments.is_empty()
    }

    fn finish(self, test_id: &str, phase: Phase, outcome: Outcome, attempt: u32) -> OutcomeRecord {
        OutcomeRecord {
            test_id: test_id.to_string(),
            phase,
            attempt,
            outcome,
            duration: self.duration,
            log: join_log(&self.log),
            attachments: self.attachments,
        }
    }
}

#[derive(Debug, Default)]
enum Stage {
    #[default]
    Idle,
    AwaitingCall,
    AwaitingTeardown {
        phase: Phase,
        outcome: Outcome,
    },
    SetupFailed,
}

#[derive(Debug, Default)]
struct Lifecycle {
    stage: Stage,
    attempt: Attempt,
    /// A rerun attempt was recorded since the last setup.
    reran: bool,
}

impl Lifecycle {
    fn at(stage: Stage, attempt: Attempt) -> Option<Self> {
        let lifecycle = Self {
            stage,
            attempt,
            reran: false,
        };
        if matches!(lifecycle.stage, Stage::Idle) && lifecycle.attempt.is_empty() {
            None
        } else {
            Some(lifecycle)
        }
    }
}

type Step = (Option<Lifecycle>, Option<OutcomeRecord>);

/// Buffers phase events per test and emits finished records.
#[derive(Debug, Default)]
pub struct TestRecordAggregator {
    pending: IndexMap<String, Lifecycle>,
    displaced: Vec<OutcomeRecord>,
}

impl TestRecordAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tests with a lifecycle in progress.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Feed one phase event. Returns the record it completed, if any.
    pub fn ingest(&mut self, event: PhaseEvent) -> Option<OutcomeRecord> {
        let test_id = base_test_id(&event.test_id).to_string();
        trace!(
            test_id = %test_id,
            phase = %event.phase,
            status = %event.status,
            rerun = event.is_rerun(),
            "Ingesting phase event"
        );

        if event.is_rerun() {
            return Some(self.ingest_rerun(&test_id, event));
        }

        let lifecycle = self.pending.shift_remove(&test_id).unwrap_or_default();
        let (next, record) = self.step(&test_id, lifecycle, event);
        if let Some(next) = next {
            self.pending.insert(test_id, next);
        }
        record
    }

    /// Records finalized early because a later phase arrived out of order.
    pub fn take_displaced(&mut self) -> Vec<OutcomeRecord> {
        std::mem::take(&mut self.displaced)
    }

    /// Flush every incomplete lifecycle at session end.
    ///
    /// Buffered outcomes that never saw their teardown are emitted as-is;
    /// displaced records not yet taken come first.
    pub fn finish(&mut self) -> Vec<OutcomeRecord> {
        let mut records = self.take_displaced();
        for (test_id, lifecycle) in self.pending.drain(..) {
            match lifecycle.stage {
                Stage::AwaitingTeardown { phase, outcome } => {
                    warn!(test_id = %test_id, %outcome, "Session ended before teardown was reported");
                    records.push(lifecycle.attempt.finish(&test_id, phase, outcome, 0));
                }
                Stage::AwaitingCall => {
                    warn!(test_id = %test_id, "Session ended before the test body was reported");
                }
                Stage::Idle | Stage::SetupFailed => {}
            }
        }
        records
    }

    fn ingest_rerun(&mut self, test_id: &str, event: PhaseEvent) -> OutcomeRecord {
        let attempt = event.rerun_index.map_or(0, |done| done + 1);
        if let Some(lifecycle) = self.pending.get_mut(test_id) {
            lifecycle.reran = true;
        }
        debug!(test_id, attempt, phase = %event.phase, "Recording rerun attempt");

        OutcomeRecord {
            test_id: test_id.to_string(),
            phase: event.phase,
            attempt,
            outcome: Outcome::Rerun,
            duration: event.duration,
            log: join_log(&phase_log(&event)),
            attachments: event.attachments,
        }
    }

    fn step(&mut self, test_id: &str, lifecycle: Lifecycle, event: PhaseEvent) -> Step {
        let Lifecycle {
            stage,
            mut attempt,
            reran,
        } = lifecycle;

        match (stage, event.phase) {
            (stage, Phase::Collect) => {
                let record = collect_record(test_id, &event);
                let next = Lifecycle::at(stage, attempt).map(|next| Lifecycle { reran, ..next });
                (next, record)
            }

            (Stage::AwaitingTeardown { phase, outcome }, Phase::Setup | Phase::Call) => {
                warn!(
                    test_id,
                    arrived = %event.phase,
                    "Phase arrived before teardown; finalizing buffered result"
                );
                self.displaced
                    .push(attempt.finish(test_id, phase, outcome, 0));
                self.step(test_id, Lifecycle::default(), event)
            }

            (Stage::SetupFailed, Phase::Setup | Phase::Call) => {
                warn!(test_id, arrived = %event.phase, "Setup error was never torn down");
                self.step(test_id, Lifecycle::default(), event)
            }

            (stage @ (Stage::Idle | Stage::AwaitingCall), Phase::Setup) => {
                if matches!(stage, Stage::AwaitingCall) {
                    trace!(test_id, reran, "Setup reported again; replacing buffered setup");
                    attempt = Attempt::default();
                }
                attempt.absorb(&event);
                match event.status {
                    Status::Passed => (Lifecycle::at(Stage::AwaitingCall, attempt), None),
                    Status::Failed => {
                        let record = attempt.finish(test_id, Phase::Setup, Outcome::Error, 0);
                        (
                            Lifecycle::at(Stage::SetupFailed, Attempt::default()),
                            Some(record),
                        )
                    }
                    Status::Skipped => {
                        let outcome = classify(Phase::Setup, Status::Skipped, event.is_xfail);
                        let stage = Stage::AwaitingTeardown {
                            phase: Phase::Setup,
                            outcome,
                        };
                        (Lifecycle::at(stage, attempt), None)
                    }
                }
            }

            (Stage::Idle | Stage::AwaitingCall, Phase::Call) => {
                let outcome = classify(Phase::Call, event.status, event.is_xfail);
                attempt.absorb(&event);
                let stage = Stage::AwaitingTeardown {
                    phase: Phase::Call,
                    outcome,
                };
                (Lifecycle::at(stage, attempt), None)
            }

            (Stage::AwaitingTeardown { phase, outcome }, Phase::Teardown) => {
                attempt.absorb(&event);
                let record = if event.status == Status::Failed {
                    debug!(test_id, replaced = %outcome, "Teardown failure overrides outcome");
                    attempt.finish(test_id, Phase::Teardown, Outcome::Error, 0)
                } else {
                    attempt.finish(test_id, phase, outcome, 0)
                };
                (None, Some(record))
            }

            (Stage::SetupFailed, Phase::Teardown) => {
                if event.status == Status::Failed {
                    let mut teardown = Attempt::default();
                    teardown.absorb(&event);
                    let record = teardown.finish(test_id, Phase::Teardown, Outcome::Error, 0);
                    (None, Some(record))
                } else {
                    trace!(test_id, "Absorbed teardown after setup error");
                    (None, None)
                }
            }

            (stage @ (Stage::Idle | Stage::AwaitingCall), Phase::Teardown) => {
                if event.status == Status::Failed {
                    attempt.absorb(&event);
                    let record = attempt.finish(test_id, Phase::Teardown, Outcome::Error, 0);
                    return (None, Some(record));
                }
                if reran {
                    trace!(test_id, "Rerun attempt torn down");
                } else if matches!(stage, Stage::AwaitingCall) {
                    warn!(test_id, "Teardown arrived without a test body; dropping attempt");
                }
                (None, None)
            }
        }
    }
}

fn collect_record(test_id: &str, event: &PhaseEvent) -> Option<OutcomeRecord> {
    if event.status != Status::Failed {
        trace!(test_id, status = %event.status, "Ignoring non-failing collection report");
        return None;
    }
    let mut attempt = Attempt::default();
    attempt.absorb(event);
    Some(attempt.finish(test_id, Phase::Collect, Outcome::Error, 0))
}
