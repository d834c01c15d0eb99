//! End-to-end tests from phase events to report results.
//!
//! Validates:
//! - One result per passing lifecycle, counted once
//! - Teardown failures replace the buffered outcome
//! - Rerun attempts each get their own result and asset names
//! - Hook-added columns become sortable values

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tr_common::{extras, Outcome, Phase, PhaseEvent, Status};
use tr_report::{
    OutcomeRecord, ReportConfig, ReportHooks, ReportSession, TableRowBuilder,
};

fn start(dir: &TempDir, config: ReportConfig) -> ReportSession {
    let config = ReportConfig {
        htmlpath: dir.path().join("report.html"),
        ..config
    };
    let mut session = ReportSession::new(config).unwrap();
    session.session_start(IndexMap::new(), None).unwrap();
    session
}

fn event(id: &str, phase: Phase, status: Status) -> PhaseEvent {
    PhaseEvent::new(id, phase, status).with_duration(0.5)
}

#[test]
fn test_passing_lifecycle_yields_one_result() {
    let dir = TempDir::new().unwrap();
    let mut session = start(&dir, ReportConfig::default());

    assert_eq!(session.handle_event(event("t.py::ok", Phase::Setup, Status::Passed)).unwrap(), 0);
    assert_eq!(session.handle_event(event("t.py::ok", Phase::Call, Status::Passed)).unwrap(), 0);
    assert_eq!(
        session
            .handle_event(event("t.py::ok", Phase::Teardown, Status::Passed))
            .unwrap(),
        1
    );

    let tests = session.model().tests();
    assert_eq!(tests.len(), 1);
    assert_eq!(tests[0].result, Outcome::Passed);
    assert_eq!(tests[0].duration, 1.5);
    assert_eq!(session.model().outcome_count(Outcome::Passed), 1);
}

#[test]
fn test_teardown_failure_overrides_pass() {
    let dir = TempDir::new().unwrap();
    let mut session = start(&dir, ReportConfig::default());

    session
        .handle_event(event("t.py::fx", Phase::Setup, Status::Passed))
        .unwrap();
    session
        .handle_event(
            event("t.py::fx", Phase::Call, Status::Passed)
                .with_section("Captured stdout call", "body ran"),
        )
        .unwrap();
    session
        .handle_event(
            event("t.py::fx::teardown", Phase::Teardown, Status::Failed)
                .with_long_representation("fixture exploded"),
        )
        .unwrap();
    let summary = session.session_finish().unwrap();

    let tests = session.model().tests();
    assert_eq!(tests.len(), 1);
    assert_eq!(tests[0].result, Outcome::Error);
    assert_eq!(tests[0].test_id, "t.py::fx::teardown");
    assert!(tests[0].log.contains("body ran"));
    assert!(tests[0].log.contains("fixture exploded"));
    assert_eq!(summary.outcomes[&Outcome::Passed], 0);
    assert_eq!(summary.outcomes[&Outcome::Error], 1);
}

#[test]
fn test_reruns_are_counted_separately() {
    let dir = TempDir::new().unwrap();
    let mut session = start(&dir, ReportConfig::default());

    session
        .handle_event(
            event("t.py::flaky", Phase::Setup, Status::Passed)
                .with_section("Captured stdout setup", "SETUP-OUT"),
        )
        .unwrap();
    for attempt in 0..3 {
        let added = session
            .handle_event(
                event("t.py::flaky", Phase::Call, Status::Failed)
                    .with_rerun(attempt)
                    .with_long_representation(format!("attempt {attempt}"))
                    .with_attachment(extras::text(format!("try {attempt}"))),
            )
            .unwrap();
        assert_eq!(added, 1);
    }
    session
        .handle_event(event("t.py::flaky", Phase::Call, Status::Failed))
        .unwrap();
    session
        .handle_event(event("t.py::flaky", Phase::Teardown, Status::Passed))
        .unwrap();
    let summary = session.session_finish().unwrap();

    assert_eq!(summary.outcomes[&Outcome::Rerun], 3);
    assert_eq!(summary.outcomes[&Outcome::Failed], 1);
    assert_eq!(summary.tests_ran, 1);

    let attempts: Vec<(Outcome, u32)> = session
        .model()
        .tests()
        .iter()
        .map(|t| (t.result, t.attempt))
        .collect();
    assert_eq!(
        attempts,
        vec![
            (Outcome::Rerun, 1),
            (Outcome::Rerun, 2),
            (Outcome::Rerun, 3),
            (Outcome::Failed, 0),
        ]
    );

    let last = &session.model().tests()[3];
    assert_eq!(last.duration, 1.5);
    assert!(last.log.contains("SETUP-OUT"));
    assert!(last.extras.is_empty());

    let hrefs: Vec<&str> = session.model().tests()[..3]
        .iter()
        .map(|t| t.extras[0].content.as_str())
        .collect();
    assert_eq!(
        hrefs,
        vec![
            "assets/t.py__flaky_0_1.txt",
            "assets/t.py__flaky_0_2.txt",
            "assets/t.py__flaky_0_3.txt",
        ]
    );
    assert!(dir.path().join("assets/t.py__flaky_0_3.txt").is_file());
}

#[test]
fn test_xfail_outcomes() {
    let dir = TempDir::new().unwrap();
    let mut session = start(&dir, ReportConfig::default());

    for (id, status) in [("t.py::xf", Status::Skipped), ("t.py::xp", Status::Passed)] {
        session.handle_event(event(id, Phase::Setup, Status::Passed)).unwrap();
        session
            .handle_event(event(id, Phase::Call, status).with_xfail(true))
            .unwrap();
        session.handle_event(event(id, Phase::Teardown, Status::Passed)).unwrap();
    }

    let outcomes: Vec<Outcome> = session.model().tests().iter().map(|t| t.result).collect();
    assert_eq!(outcomes, vec![Outcome::XFailed, Outcome::XPassed]);
}

#[test]
fn test_unfinished_tests_are_flushed() {
    let dir = TempDir::new().unwrap();
    let mut session = start(&dir, ReportConfig::default());
    session
        .handle_event(event("t.py::cut", Phase::Call, Status::Passed))
        .unwrap();
    assert!(session.model().tests().is_empty());

    let summary = session.session_finish().unwrap();
    assert_eq!(summary.outcomes[&Outcome::Passed], 1);
}

struct OwnerColumn;

impl ReportHooks for OwnerColumn {
    fn report_title(&self, _current: &str) -> Option<String> {
        Some("Nightly".to_string())
    }

    fn results_table_header(&self, header: &mut TableRowBuilder) {
        header.insert(2, r#"<th class="sortable" data-column-type="owner">Owner</th>"#);
        header.remove(4);
    }

    fn results_table_row(&self, record: &OutcomeRecord, row: &mut TableRowBuilder) {
        let owner = record.test_id.split("::").next().unwrap_or_default();
        row.insert(2, format!(r#"<td class="col-owner">{owner}</td>"#));
        row.remove(4);
    }

    fn results_table_html(&self, _record: &OutcomeRecord, log: &mut Vec<String>) {
        log.clear();
        log.push("log replaced".to_string());
    }

    fn duration_format(&self, seconds: f64) -> Option<String> {
        Some(format!("{seconds:.1}s"))
    }
}

#[test]
fn test_hooks_reshape_table() {
    let dir = TempDir::new().unwrap();
    let mut session = start(&dir, ReportConfig::default()).with_hooks(OwnerColumn);
    session.session_start(IndexMap::new(), None).unwrap();
    for phase in [Phase::Setup, Phase::Call, Phase::Teardown] {
        session.handle_event(event("pkg.py::t", phase, Status::Passed)).unwrap();
    }
    session.session_finish().unwrap();

    let model = session.model();
    assert_eq!(model.title(), "Nightly");
    assert_eq!(model.table_header().len(), 4);

    let result = &model.tests()[0];
    assert_eq!(result.sortable.get("owner").map(String::as_str), Some("pkg.py"));
    assert_eq!(result.sortable.get("duration").map(String::as_str), Some("1.5s"));
    assert!(result.results_table_row.cells().iter().all(|c| !c.contains("col-links")));
    assert_eq!(result.log, "log replaced");
}
