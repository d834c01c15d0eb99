//! Attachments ("extras") carried by a test report.
//!
//! Collaborators hand attachments over as loosely typed dictionaries of the
//! form `{format_type, content, name, mime_type, extension}` ([`ExtraSpec`]).
//! They are converted once into the [`Attachment`] sum type so that each
//! variant carries exactly the fields its format needs.

use crate::{extras, Error};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Attachment format discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FormatType {
    Html,
    Image,
    Json,
    Text,
    Url,
    Video,
}

impl FormatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatType::Html => "html",
            FormatType::Image => "image",
            FormatType::Json => "json",
            FormatType::Text => "text",
            FormatType::Url => "url",
            FormatType::Video => "video",
        }
    }

    /// Formats listed in the results table's Links column.
    pub fn is_link(&self) -> bool {
        matches!(self, FormatType::Json | FormatType::Text | FormatType::Url)
    }

    /// Formats whose content is (normally) base64 encoded binary.
    pub fn is_media(&self) -> bool {
        matches!(self, FormatType::Image | FormatType::Video)
    }
}

impl fmt::Display for FormatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(FormatType::Html),
            "image" => Ok(FormatType::Image),
            "json" => Ok(FormatType::Json),
            "text" => Ok(FormatType::Text),
            "url" => Ok(FormatType::Url),
            "video" => Ok(FormatType::Video),
            other => Err(Error::UnknownFormat(other.to_string())),
        }
    }
}

/// Payload of a file-backed attachment (image, video, text).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FilePayload {
    /// Display label.
    pub name: String,
    /// Raw text, base64 data, or (for media) a path or URL.
    pub content: String,
    pub mime_type: String,
    /// Extension used when written to disk.
    pub extension: String,
}

/// Payload of a JSON attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct JsonPayload {
    pub name: String,
    /// Any JSON value; serialized before encoding.
    pub content: serde_json::Value,
    pub mime_type: String,
    pub extension: String,
}

/// A single attachment, one variant per format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "format_type", rename_all = "lowercase")]
pub enum Attachment {
    /// Trusted HTML embedded verbatim.
    Html { content: String },
    /// A link target used as-is.
    Url { name: String, content: String },
    Image(FilePayload),
    Video(FilePayload),
    Json(JsonPayload),
    Text(FilePayload),
}

impl Attachment {
    pub fn format_type(&self) -> FormatType {
        match self {
            Attachment::Html { .. } => FormatType::Html,
            Attachment::Url { .. } => FormatType::Url,
            Attachment::Image(_) => FormatType::Image,
            Attachment::Video(_) => FormatType::Video,
            Attachment::Json(_) => FormatType::Json,
            Attachment::Text(_) => FormatType::Text,
        }
    }

    /// Display label; HTML fragments have none.
    pub fn name(&self) -> Option<&str> {
        match self {
            Attachment::Html { .. } => None,
            Attachment::Url { name, .. } => Some(name),
            Attachment::Image(p) | Attachment::Video(p) | Attachment::Text(p) => Some(&p.name),
            Attachment::Json(p) => Some(&p.name),
        }
    }

    pub fn mime_type(&self) -> Option<&str> {
        match self {
            Attachment::Html { .. } | Attachment::Url { .. } => None,
            Attachment::Image(p) | Attachment::Video(p) | Attachment::Text(p) => {
                Some(&p.mime_type)
            }
            Attachment::Json(p) => Some(&p.mime_type),
        }
    }

    pub fn extension(&self) -> Option<&str> {
        match self {
            Attachment::Html { .. } | Attachment::Url { .. } => None,
            Attachment::Image(p) | Attachment::Video(p) | Attachment::Text(p) => {
                Some(&p.extension)
            }
            Attachment::Json(p) => Some(&p.extension),
        }
    }
}

/// Loosely typed attachment as produced by user code or other plugins.
///
/// Missing `name`, `mime_type` and `extension` fields fall back to the same
/// defaults as the [`extras`] constructors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExtraSpec {
    pub format_type: String,
    #[serde(default)]
    pub content: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl TryFrom<ExtraSpec> for Attachment {
    type Error = Error;

    fn try_from(spec: ExtraSpec) -> Result<Self, Self::Error> {
        let ExtraSpec {
            format_type,
            content,
            name,
            mime_type,
            extension,
        } = spec;
        let format: FormatType = format_type.parse()?;

        let attachment = match format {
            FormatType::Json => {
                let defaults = extras::JSON_DEFAULTS;
                Attachment::Json(JsonPayload {
                    name: name.unwrap_or_else(|| defaults.name.to_string()),
                    content,
                    mime_type: mime_type.unwrap_or_else(|| defaults.mime_type.to_string()),
                    extension: extension.unwrap_or_else(|| defaults.extension.to_string()),
                })
            }
            FormatType::Html => Attachment::Html {
                content: string_content(format, content)?,
            },
            FormatType::Url => Attachment::Url {
                name: name.unwrap_or_else(|| extras::URL_NAME.to_string()),
                content: string_content(format, content)?,
            },
            FormatType::Image => Attachment::Image(extras::IMAGE_DEFAULTS.payload(
                name,
                string_content(format, content)?,
                mime_type,
                extension,
            )),
            FormatType::Video => Attachment::Video(extras::VIDEO_DEFAULTS.payload(
                name,
                string_content(format, content)?,
                mime_type,
                extension,
            )),
            FormatType::Text => Attachment::Text(extras::TEXT_DEFAULTS.payload(
                name,
                string_content(format, content)?,
                mime_type,
                extension,
            )),
        };

        Ok(attachment)
    }
}

fn string_content(format: FormatType, content: serde_json::Value) -> Result<String, Error> {
    match content {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Null => Err(Error::MissingContent {
            format: format.to_string(),
        }),
        other => Err(Error::NonStringContent {
            format: format.to_string(),
            found: json_kind(&other).to_string(),
        }),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn spec(value: serde_json::Value) -> ExtraSpec {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_image_spec_uses_defaults() {
        let attachment =
            Attachment::try_from(spec(json!({"format_type": "image", "content": "aGk="}))).unwrap();
        assert_eq!(attachment.format_type(), FormatType::Image);
        assert_eq!(attachment.name(), Some("Image"));
        assert_eq!(attachment.mime_type(), Some("image/png"));
        assert_eq!(attachment.extension(), Some("png"));
    }

    #[test]
    fn test_spec_overrides_defaults() {
        let attachment = Attachment::try_from(spec(json!({
            "format_type": "image",
            "content": "aGk=",
            "name": "Screenshot",
            "mime_type": "image/jpeg",
            "extension": "jpg",
        })))
        .unwrap();
        assert_eq!(attachment.name(), Some("Screenshot"));
        assert_eq!(attachment.mime_type(), Some("image/jpeg"));
        assert_eq!(attachment.extension(), Some("jpg"));
    }

    #[test]
    fn test_json_spec_keeps_structured_content() {
        let attachment = Attachment::try_from(spec(json!({
            "format_type": "json",
            "content": {"a": [1, 2]},
        })))
        .unwrap();
        match attachment {
            Attachment::Json(payload) => {
                assert_eq!(payload.content, json!({"a": [1, 2]}));
                assert_eq!(payload.name, "JSON");
                assert_eq!(payload.extension, "json");
            }
            other => panic!("expected json attachment, got {other:?}"),
        }
    }

    #[test]
    fn test_html_and_url_carry_no_file_fields() {
        let html =
            Attachment::try_from(spec(json!({"format_type": "html", "content": "<b>x</b>"})))
                .unwrap();
        assert_eq!(html.name(), None);
        assert_eq!(html.extension(), None);

        let url = Attachment::try_from(spec(json!({
            "format_type": "url",
            "content": "https://example.com",
            "name": "Docs",
        })))
        .unwrap();
        assert_eq!(url.name(), Some("Docs"));
        assert_eq!(url.mime_type(), None);
    }

    #[test]
    fn test_invalid_specs_are_rejected() {
        let err = Attachment::try_from(spec(json!({"format_type": "gif", "content": "x"})))
            .unwrap_err();
        assert_eq!(err.code(), "unknown_format");

        let err = Attachment::try_from(spec(json!({"format_type": "text"}))).unwrap_err();
        assert_eq!(err.code(), "missing_content");

        let err =
            Attachment::try_from(spec(json!({"format_type": "text", "content": 5}))).unwrap_err();
        assert_eq!(err.code(), "non_string_content");
    }

    #[test]
    fn test_attachment_wire_shape() {
        let value = serde_json::to_value(extras::text("hello")).unwrap();
        assert_eq!(
            value,
            json!({
                "format_type": "text",
                "name": "Text",
                "content": "hello",
                "mime_type": "text/plain",
                "extension": "txt",
            })
        );
    }

    #[test]
    fn test_link_formats() {
        assert!(FormatType::Json.is_link());
        assert!(FormatType::Url.is_link());
        assert!(!FormatType::Image.is_link());
        assert!(FormatType::Video.is_media());
        assert!(!FormatType::Html.is_media());
    }
}
