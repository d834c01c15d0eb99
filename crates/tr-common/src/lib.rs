//! Shared types for the test report pipeline.
//!
//! This crate provides the vocabulary every other crate speaks:
//! - Lifecycle phases and raw per-phase statuses
//! - The seven canonical report outcomes
//! - Phase events as delivered by a runner adapter
//! - Attachments ("extras") and their convenience constructors
//! - Common error types

pub mod attachment;
pub mod error;
pub mod event;
pub mod extras;
pub mod id;
pub mod outcome;
pub mod output;

pub use attachment::{Attachment, ExtraSpec, FilePayload, FormatType, JsonPayload};
pub use error::{Error, Result};
pub use event::{LogSection, Phase, PhaseEvent, Status};
pub use id::{base_test_id, display_test_id, TestId};
pub use outcome::Outcome;
pub use output::OutputFormat;
