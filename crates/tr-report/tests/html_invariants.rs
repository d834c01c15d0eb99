//! HTML report invariant tests.
//!
//! These tests validate the generated HTML structure without a browser:
//! - Required sections present
//! - Self-contained mode: no stylesheet link, every asset inlined
//! - Linked mode: assets written next to the report and referenced relatively
//! - User-controlled text escaped everywhere it is embedded

use indexmap::IndexMap;
use regex::Regex;
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use tr_common::{extras, Phase, PhaseEvent, Status};
use tr_report::codec::decode_data_uri;
use tr_report::{ReportConfig, ReportSession, ReportSnapshot};

const PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

fn run(dir: &TempDir, config: ReportConfig) -> (String, ReportSession) {
    let config = ReportConfig {
        htmlpath: dir.path().join("out").join("report.html"),
        ..config
    };
    let mut session = ReportSession::new(config).unwrap();

    let mut env = IndexMap::new();
    env.insert("Python".to_string(), json!("3.12.1"));
    env.insert("API_TOKEN".to_string(), json!("hunter2"));
    env.insert("<script>".to_string(), json!("<b>bold</b>"));
    session.session_start(env, None).unwrap();
    session.set_collected(2);

    session
        .handle_event(PhaseEvent::new("test_a.py::test_media", Phase::Setup, Status::Passed))
        .unwrap();
    session
        .handle_event(
            PhaseEvent::new("test_a.py::test_media", Phase::Call, Status::Failed)
                .with_duration(0.25)
                .with_long_representation("assert 1 == 2 <-- nope")
                .with_attachment(extras::png(PNG_BASE64, "Screenshot"))
                .with_attachment(extras::text("plain log"))
                .with_attachment(extras::json(json!({"b": 1, "a": [1, 2]})))
                .with_attachment(extras::url("https://ci.test/job/1"))
                .with_attachment(extras::html("<p class=\"trusted\">ok</p>")),
        )
        .unwrap();
    session
        .handle_event(PhaseEvent::new("test_a.py::test_media", Phase::Teardown, Status::Passed))
        .unwrap();

    for phase in [Phase::Setup, Phase::Call, Phase::Teardown] {
        session
            .handle_event(PhaseEvent::new("test_a.py::test_ok[<param>]", phase, Status::Passed))
            .unwrap();
    }
    session.session_finish().unwrap();

    let html = fs::read_to_string(dir.path().join("out/report.html")).unwrap();
    (html, session)
}

fn config(self_contained: bool) -> ReportConfig {
    ReportConfig::default()
        .with_self_contained(self_contained)
        .with_redact_pattern("API_")
}

fn json_blob(html: &str) -> ReportSnapshot {
    let re = Regex::new(r#"data-jsonblob="([^"]*)""#).unwrap();
    let escaped = &re.captures(html).expect("json blob present")[1];
    let raw = escaped
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn test_required_sections_present() {
    let dir = TempDir::new().unwrap();
    let (html, _) = run(&dir, config(true));

    for marker in [
        "<!DOCTYPE html>",
        r#"<h1 id="title">report.html</h1>"#,
        r#"<table id="environment">"#,
        r#"<div class="summary">"#,
        r#"<table id="results-table" data-initial-sort="result">"#,
        r#"<div id="data-container" data-jsonblob="#,
        "2 tests took",
    ] {
        assert!(html.contains(marker), "missing {marker}");
    }
}

#[test]
fn test_self_contained_inlines_everything() {
    let dir = TempDir::new().unwrap();
    let (html, session) = run(&dir, config(true));

    assert!(html.contains("<style>"));
    assert!(!html.contains(r#"href="assets/"#));
    assert!(!dir.path().join("out/assets").exists());

    let extras = &session.model().tests()[0].extras;
    assert!(extras[0].content.starts_with("data:image/png;base64,iVBOR"));
    let text = decode_data_uri(&extras[1].content).unwrap();
    assert_eq!(text.text(), Some("plain log"));
    let json = decode_data_uri(&extras[2].content).unwrap();
    assert_eq!(json.mime_type, "application/json");
    let value: serde_json::Value = serde_json::from_str(json.text().unwrap()).unwrap();
    assert_eq!(value, json!({"a": [1, 2], "b": 1}));
    assert_eq!(extras[3].content, "https://ci.test/job/1");
}

#[test]
fn test_linked_mode_writes_assets() {
    let dir = TempDir::new().unwrap();
    let (html, session) = run(&dir, config(false));
    let assets = dir.path().join("out/assets");

    assert!(html.contains(r#"<link href="assets/style.css""#));
    assert!(assets.join("style.css").is_file());

    let extras = &session.model().tests()[0].extras;
    assert_eq!(extras[0].content, "assets/test_a.py__test_media_0_0.png");
    assert_eq!(extras[1].content, "assets/test_a.py__test_media_1_0.txt");
    assert_eq!(extras[2].content, "assets/test_a.py__test_media_2_0.json");

    let png = fs::read(assets.join("test_a.py__test_media_0_0.png")).unwrap();
    assert_eq!(&png[1..4], b"PNG");
    let text = fs::read_to_string(assets.join("test_a.py__test_media_1_0.txt")).unwrap();
    assert_eq!(text, "plain log");
    assert!(html.contains(r#"href="assets/test_a.py__test_media_1_0.txt""#));
}

#[test]
fn test_user_text_is_escaped() {
    let dir = TempDir::new().unwrap();
    let (html, _) = run(&dir, config(true));

    assert!(!html.contains("<script>"));
    assert!(!html.contains("<b>bold</b>"));
    assert!(html.contains("<td>&lt;script&gt;</td>"));
    assert!(html.contains("test_a.py::test_ok[&lt;param&gt;]"));
    assert!(html.contains("assert 1 == 2 &lt;-- nope"));
    assert!(html.contains(r#"<p class="trusted">ok</p>"#));
}

#[test]
fn test_environment_is_redacted() {
    let dir = TempDir::new().unwrap();
    let (html, _) = run(&dir, config(true));

    assert!(!html.contains("hunter2"));
    assert!(html.contains("<td>\u{2593}\u{2593}\u{2593}\u{2593}\u{2593}\u{2593}\u{2593}</td>"));
    assert!(html.contains("<td>3.12.1</td>"));
}

#[test]
fn test_json_blob_matches_model() {
    let dir = TempDir::new().unwrap();
    let (html, session) = run(&dir, config(true));

    let blob = json_blob(&html);
    assert_eq!(blob, session.model().snapshot());
    assert_eq!(blob.results().count(), 2);
    assert_eq!(blob.tests["test_a.py::test_media"][0].sortable["result"], "Failed");
}
