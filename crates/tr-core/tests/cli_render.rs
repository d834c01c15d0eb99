//! End-to-end CLI tests: runner stream in, HTML report out.

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn testreport(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("testreport").expect("testreport binary should exist");
    cmd.current_dir(dir.path())
        .env_remove("TESTREPORT_CONFIG")
        .env_remove("TESTREPORT_LOG")
        .env_remove("RUST_LOG");
    cmd
}

fn report(nodeid: &str, when: &str, outcome: &str) -> Value {
    json!({"type": "report", "nodeid": nodeid, "when": when, "outcome": outcome, "duration": 0.1})
}

/// A small run: one pass, one failure with an extra, one flaky test with a rerun.
fn write_stream(path: &Path) {
    let mut lines = vec![
        json!({"type": "session_start", "environment": {"Python": "3.12", "CI_TOKEN": "abc123"}}),
        json!({"type": "collection_finish", "collected": 3}),
    ];
    for when in ["setup", "call", "teardown"] {
        lines.push(report("tests/test_a.py::test_ok", when, "passed"));
    }
    lines.push(report("tests/test_a.py::test_bad", "setup", "passed"));
    let mut failed = report("tests/test_a.py::test_bad", "call", "failed");
    failed["longrepr"] = json!("AssertionError: 1 != 2");
    failed["sections"] = json!([["Captured stdout call", "hello from call"]]);
    failed["extras"] = json!([{"format_type": "text", "content": "attached text"}]);
    lines.push(failed);
    lines.push(report("tests/test_a.py::test_bad", "teardown", "passed"));

    lines.push(report("tests/test_a.py::test_flaky", "setup", "passed"));
    let mut rerun = report("tests/test_a.py::test_flaky", "call", "rerun");
    rerun["rerun"] = json!(0);
    lines.push(rerun);
    lines.push(report("tests/test_a.py::test_flaky", "setup", "passed"));
    lines.push(report("tests/test_a.py::test_flaky", "call", "passed"));
    lines.push(report("tests/test_a.py::test_flaky", "teardown", "passed"));
    lines.push(json!({"type": "session_finish"}));

    let text: String = lines.iter().map(|l| format!("{l}\n")).collect();
    fs::write(path, text).unwrap();
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout should be JSON")
}

#[test]
fn render_linked_report() {
    let dir = TempDir::new().unwrap();
    write_stream(&dir.path().join("events.jsonl"));

    let response = stdout_json(testreport(&dir).args([
        "render",
        "events.jsonl",
        "--html",
        "out/report.html",
        "--redact",
        "TOKEN",
    ]));

    assert_eq!(response["status"], "ok");
    assert!(response["run_id"].as_str().unwrap().starts_with("run-"));
    let summary = &response["summary"];
    assert_eq!(summary["collected"], 3);
    assert_eq!(summary["tests_ran"], 3);
    assert_eq!(summary["title"], "report.html");
    assert_eq!(summary["outcomes"]["passed"], 2);
    assert_eq!(summary["outcomes"]["failed"], 1);
    assert_eq!(summary["outcomes"]["rerun"], 1);

    let out = dir.path().join("out");
    let html = fs::read_to_string(out.join("report.html")).unwrap();
    assert!(html.contains("3 tests took"));
    assert!(html.contains("AssertionError: 1 != 2"));
    assert!(html.contains("hello from call"));
    assert!(!html.contains("abc123"));
    assert!(out.join("assets/style.css").is_file());
    assert_eq!(
        fs::read_to_string(out.join("assets/tests_test_a.py__test_bad_0_0.txt")).unwrap(),
        "attached text"
    );
}

#[test]
fn render_self_contained_from_stdin() {
    let dir = TempDir::new().unwrap();
    let events = dir.path().join("events.jsonl");
    write_stream(&events);

    testreport(&dir)
        .args([
            "--format",
            "summary",
            "render",
            "-",
            "--html",
            "report.html",
            "--self-contained-html",
            "--title",
            "Nightly",
        ])
        .write_stdin(fs::read_to_string(&events).unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 failed, 2 passed, 1 rerun"))
        .stdout(predicate::str::contains("report.html"));

    let html = fs::read_to_string(dir.path().join("report.html")).unwrap();
    assert!(html.contains(r#"<h1 id="title">Nightly</h1>"#));
    assert!(html.contains("data:text/plain;charset=utf-8;base64,"));
    assert!(!dir.path().join("assets").exists());
}

#[test]
fn truncated_stream_still_writes_report() {
    let dir = TempDir::new().unwrap();
    let input = [
        report("t.py::a", "setup", "passed"),
        report("t.py::a", "call", "passed"),
    ]
    .iter()
    .map(|l| format!("{l}\n"))
    .collect::<String>();

    let response = stdout_json(
        testreport(&dir)
            .args(["render", "--html", "report.html"])
            .write_stdin(input),
    );
    assert_eq!(response["summary"]["outcomes"]["passed"], 1);
    assert!(dir.path().join("report.html").is_file());
}

#[test]
fn config_file_is_discovered_and_overridden() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("testreport.toml"),
        "htmlpath = \"from-file.html\"\nrender_collapsed = \"all\"\ninitial_sort = \"duration\"\n",
    )
    .unwrap();

    let response = stdout_json(testreport(&dir).arg("check"));
    assert_eq!(response["config"]["htmlpath"], "from-file.html");
    assert_eq!(response["config"]["render_collapsed"], "all");
    assert!(response["config_source"]
        .as_str()
        .unwrap()
        .ends_with("testreport.toml"));

    testreport(&dir)
        .args(["render", "--initial-sort", "testId"])
        .write_stdin("{\"type\": \"session_finish\"}\n")
        .assert()
        .success();
    let html = fs::read_to_string(dir.path().join("from-file.html")).unwrap();
    assert!(html.contains(r#"data-initial-sort="testId""#));
}

#[test]
fn schema_command_lists_and_prints() {
    let dir = TempDir::new().unwrap();
    testreport(&dir)
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("RunnerMessage"))
        .stdout(predicate::str::contains("ExtraSpec"));

    let schema = stdout_json(testreport(&dir).args(["schema", "RunnerReport", "--compact"]));
    assert!(schema.to_string().contains("nodeid"));

    let all = stdout_json(testreport(&dir).args(["schema", "--all"]));
    assert!(all.get("PhaseEvent").is_some());
}

#[test]
fn version_reports_package_version() {
    let dir = TempDir::new().unwrap();
    let info = stdout_json(testreport(&dir).arg("version"));
    assert_eq!(info["testreport_version"], env!("CARGO_PKG_VERSION"));
}
