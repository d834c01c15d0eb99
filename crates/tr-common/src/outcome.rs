//! Canonical report outcomes.

use crate::Error;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Final displayed classification of a test record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Failed,
    Passed,
    Skipped,
    #[serde(rename = "xfailed")]
    XFailed,
    #[serde(rename = "xpassed")]
    XPassed,
    Error,
    Rerun,
}

impl Outcome {
    /// Summary order used by the report header.
    pub const ALL: [Outcome; 7] = [
        Outcome::Failed,
        Outcome::Passed,
        Outcome::Skipped,
        Outcome::XFailed,
        Outcome::XPassed,
        Outcome::Error,
        Outcome::Rerun,
    ];

    /// Lowercase key, used for CSS classes and count lookup.
    pub fn key(&self) -> &'static str {
        match self {
            Outcome::Failed => "failed",
            Outcome::Passed => "passed",
            Outcome::Skipped => "skipped",
            Outcome::XFailed => "xfailed",
            Outcome::XPassed => "xpassed",
            Outcome::Error => "error",
            Outcome::Rerun => "rerun",
        }
    }

    /// Label shown in the Result column.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Failed => "Failed",
            Outcome::Passed => "Passed",
            Outcome::Skipped => "Skipped",
            Outcome::XFailed => "XFailed",
            Outcome::XPassed => "XPassed",
            Outcome::Error => "Error",
            Outcome::Rerun => "Rerun",
        }
    }

    /// Label shown next to the count in the summary.
    pub fn summary_label(&self) -> &'static str {
        match self {
            Outcome::Failed => "Failed",
            Outcome::Passed => "Passed",
            Outcome::Skipped => "Skipped",
            Outcome::XFailed => "Expected failures",
            Outcome::XPassed => "Unexpected passes",
            Outcome::Error => "Errors",
            Outcome::Rerun => "Reruns",
        }
    }

    /// Sort rank when ordering rows by result; lower is more severe.
    pub fn severity(&self) -> u8 {
        match self {
            Outcome::Error => 0,
            Outcome::Failed => 1,
            Outcome::Rerun => 2,
            Outcome::XFailed => 3,
            Outcome::XPassed => 4,
            Outcome::Skipped => 5,
            Outcome::Passed => 6,
        }
    }

    /// Whether the outcome counts toward the "tests ran" figure.
    pub fn counts_as_run(&self) -> bool {
        matches!(
            self,
            Outcome::Passed | Outcome::Failed | Outcome::XPassed | Outcome::XFailed
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Outcome {
    type Err = Error;

    /// Accepts either the key (`xfailed`) or the label (`XFailed`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Outcome::ALL
            .into_iter()
            .find(|outcome| outcome.key() == lowered)
            .ok_or_else(|| Error::UnknownOutcome(s.to_string()))
    }
}
