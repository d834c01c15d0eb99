//! Attachment contract tests against the loose `{format_type, content, ...}` shape.

use pretty_assertions::assert_eq;
use serde_json::json;
use tr_common::{extras, Attachment, ExtraSpec, FormatType, PhaseEvent};

fn parse(value: serde_json::Value) -> tr_common::Result<Attachment> {
    let spec: ExtraSpec = serde_json::from_value(value)?;
    Attachment::try_from(spec)
}

#[test]
fn constructors_match_loose_specs() {
    let cases = [
        (json!({"format_type": "image", "content": "aGk="}), extras::image("aGk=")),
        (json!({"format_type": "video", "content": "aGk="}), extras::video("aGk=")),
        (json!({"format_type": "text", "content": "hi"}), extras::text("hi")),
        (json!({"format_type": "url", "content": "https://x"}), extras::url("https://x")),
        (json!({"format_type": "html", "content": "<i>x</i>"}), extras::html("<i>x</i>")),
        (
            json!({"format_type": "json", "content": {"k": 1}}),
            extras::json(json!({"k": 1})),
        ),
    ];

    for (loose, expected) in cases {
        assert_eq!(parse(loose).unwrap(), expected);
    }
}

#[test]
fn attachments_survive_event_serialization_in_order() {
    let event = PhaseEvent::new("t.py::a", tr_common::Phase::Call, tr_common::Status::Passed)
        .with_attachment(extras::png("aGk=", "first"))
        .with_attachment(extras::text("second"))
        .with_attachment(extras::url("https://third"));

    let text = serde_json::to_string(&event).unwrap();
    let back: PhaseEvent = serde_json::from_str(&text).unwrap();

    let formats: Vec<FormatType> = back.attachments.iter().map(Attachment::format_type).collect();
    assert_eq!(formats, vec![FormatType::Image, FormatType::Text, FormatType::Url]);
    assert_eq!(back.attachments[0].name(), Some("first"));
}

#[test]
fn unknown_format_is_reported_by_name() {
    let err = parse(json!({"format_type": "audio", "content": "x"})).unwrap_err();
    assert_eq!(err.to_string(), "unknown attachment format: audio");
}
