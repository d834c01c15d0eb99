//! Test identifiers.
//!
//! A runner names each test by a node id such as `tests/test_a.py::test_b[1]`.
//! Non-call phases may arrive with a `::setup`, `::teardown` or `::collect`
//! suffix; every phase of one logical test shares the same base id.

use crate::{Outcome, Phase};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base test id wrapper with display formatting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestId(pub String);

impl TestId {
    /// Build from a raw runner id, stripping any phase suffix.
    pub fn from_raw(raw: &str) -> Self {
        TestId(base_test_id(raw).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TestId {
    fn from(raw: &str) -> Self {
        TestId::from_raw(raw)
    }
}

const PHASE_SUFFIXES: [&str; 3] = ["::setup", "::teardown", "::collect"];

/// Strip a trailing phase suffix, if any. Only one suffix is removed.
pub fn base_test_id(raw: &str) -> &str {
    PHASE_SUFFIXES
        .iter()
        .find_map(|suffix| raw.strip_suffix(suffix))
        .unwrap_or(raw)
}

/// Id shown in the Test column: errors carry the phase that raised them.
pub fn display_test_id(base: &str, phase: Phase, outcome: Outcome) -> String {
    if outcome == Outcome::Error {
        format!("{base}::{phase}")
    } else {
        base.to_string()
    }
}
