//! Test result aggregation and HTML report generation.
//!
//! Phase events from a test runner flow through this crate as follows:
//!
//! - [`aggregator`] buffers setup/call/teardown events per test and emits one
//!   [`OutcomeRecord`] per finished attempt, classified by [`outcome`]
//! - [`codec`] turns attachments into data URIs or files under `assets/`
//! - [`table`] builds the result row, which [`hooks`] may reshape
//! - [`model`] accumulates rows and counters for the run
//! - [`generator`] renders a model snapshot into one HTML document
//!
//! [`ReportSession`] ties these together and owns the output files.
//!
//! # Example
//!
//! ```no_run
//! use indexmap::IndexMap;
//! use tr_common::{Phase, PhaseEvent, Status};
//! use tr_report::{ReportConfig, ReportSession};
//!
//! let config = ReportConfig::new("report.html").with_self_contained(true);
//! let mut session = ReportSession::new(config).unwrap();
//! session.session_start(IndexMap::new(), None).unwrap();
//! for phase in [Phase::Setup, Phase::Call, Phase::Teardown] {
//!     session
//!         .handle_event(PhaseEvent::new("test_math.py::test_add", phase, Status::Passed))
//!         .unwrap();
//! }
//! let summary = session.session_finish().unwrap();
//! println!("{}", summary.report.display());
//! ```

pub mod aggregator;
pub mod codec;
pub mod config;
pub mod error;
pub mod generator;
pub mod hooks;
pub mod log;
pub mod model;
pub mod outcome;
pub mod session;
pub mod table;

pub use aggregator::{OutcomeRecord, TestRecordAggregator};
pub use codec::{AssetMode, AttachmentCodec, RenderedExtra};
pub use config::ReportConfig;
pub use error::{ReportError, Result};
pub use generator::{render, ReportGenerator};
pub use hooks::{HookChain, NoopHooks, ReportHooks};
pub use model::{
    AdditionalSummary, InitialSort, RenderCollapsed, ReportModel, ReportSnapshot, RunningState,
    TestResult,
};
pub use outcome::classify;
pub use session::{ReportSession, SessionSummary};
pub use table::{TableRow, TableRowBuilder};
