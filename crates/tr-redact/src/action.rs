//! Redaction actions.

use serde::{Deserialize, Serialize};

/// What happened to one environment entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Passed through unchanged.
    #[default]
    Allow,
    /// Value replaced by a run of mask characters.
    Mask,
}
