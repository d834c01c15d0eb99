//! Convenience constructors for attachments.
//!
//! ```
//! use tr_common::extras;
//!
//! let shot = extras::png("iVBORw0KGgo=", "Screenshot");
//! assert_eq!(shot.extension(), Some("png"));
//! ```

use crate::{Attachment, FilePayload, JsonPayload};

/// Default label, MIME type and extension of one attachment format.
#[derive(Debug, Clone, Copy)]
pub struct FileDefaults {
    pub name: &'static str,
    pub mime_type: &'static str,
    pub extension: &'static str,
}

impl FileDefaults {
    /// Build a payload, falling back to these defaults for missing fields.
    pub fn payload(
        &self,
        name: Option<String>,
        content: String,
        mime_type: Option<String>,
        extension: Option<String>,
    ) -> FilePayload {
        FilePayload {
            name: name.unwrap_or_else(|| self.name.to_string()),
            content,
            mime_type: mime_type.unwrap_or_else(|| self.mime_type.to_string()),
            extension: extension.unwrap_or_else(|| self.extension.to_string()),
        }
    }
}

pub const IMAGE_DEFAULTS: FileDefaults = FileDefaults {
    name: "Image",
    mime_type: "image/png",
    extension: "png",
};

pub const VIDEO_DEFAULTS: FileDefaults = FileDefaults {
    name: "Video",
    mime_type: "video/mp4",
    extension: "mp4",
};

pub const TEXT_DEFAULTS: FileDefaults = FileDefaults {
    name: "Text",
    mime_type: "text/plain",
    extension: "txt",
};

pub const JSON_DEFAULTS: FileDefaults = FileDefaults {
    name: "JSON",
    mime_type: "application/json",
    extension: "json",
};

pub const URL_NAME: &str = "URL";

/// Trusted HTML fragment.
pub fn html(content: impl Into<String>) -> Attachment {
    Attachment::Html {
        content: content.into(),
    }
}

/// PNG image with default label.
pub fn image(content: impl Into<String>) -> Attachment {
    Attachment::Image(IMAGE_DEFAULTS.payload(None, content.into(), None, None))
}

pub fn png(content: impl Into<String>, name: impl Into<String>) -> Attachment {
    Attachment::Image(IMAGE_DEFAULTS.payload(Some(name.into()), content.into(), None, None))
}

pub fn jpg(content: impl Into<String>, name: impl Into<String>) -> Attachment {
    Attachment::Image(FilePayload {
        name: name.into(),
        content: content.into(),
        mime_type: "image/jpeg".to_string(),
        extension: "jpg".to_string(),
    })
}

pub fn svg(content: impl Into<String>, name: impl Into<String>) -> Attachment {
    Attachment::Image(FilePayload {
        name: name.into(),
        content: content.into(),
        mime_type: "image/svg+xml".to_string(),
        extension: "svg".to_string(),
    })
}

/// MP4 video with default label.
pub fn video(content: impl Into<String>) -> Attachment {
    Attachment::Video(VIDEO_DEFAULTS.payload(None, content.into(), None, None))
}

pub fn mp4(content: impl Into<String>, name: impl Into<String>) -> Attachment {
    Attachment::Video(VIDEO_DEFAULTS.payload(Some(name.into()), content.into(), None, None))
}

pub fn text(content: impl Into<String>) -> Attachment {
    Attachment::Text(TEXT_DEFAULTS.payload(None, content.into(), None, None))
}

pub fn json(content: serde_json::Value) -> Attachment {
    Attachment::Json(JsonPayload {
        name: JSON_DEFAULTS.name.to_string(),
        content,
        mime_type: JSON_DEFAULTS.mime_type.to_string(),
        extension: JSON_DEFAULTS.extension.to_string(),
    })
}

pub fn url(content: impl Into<String>) -> Attachment {
    Attachment::Url {
        name: URL_NAME.to_string(),
        content: content.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FormatType;

    #[test]
    fn test_constructor_defaults() {
        let cases = [
            (image("x"), FormatType::Image, Some("Image"), Some("png")),
            (jpg("x", "Shot"), FormatType::Image, Some("Shot"), Some("jpg")),
            (svg("x", "Logo"), FormatType::Image, Some("Logo"), Some("svg")),
            (mp4("x", "Clip"), FormatType::Video, Some("Clip"), Some("mp4")),
            (text("x"), FormatType::Text, Some("Text"), Some("txt")),
            (json(serde_json::json!({})), FormatType::Json, Some("JSON"), Some("json")),
            (url("https://a"), FormatType::Url, Some("URL"), None),
            (html("<p/>"), FormatType::Html, None, None),
        ];

        for (attachment, format, name, extension) in cases {
            assert_eq!(attachment.format_type(), format);
            assert_eq!(attachment.name(), name);
            assert_eq!(attachment.extension(), extension);
        }
    }

    #[test]
    fn test_svg_mime_type() {
        assert_eq!(svg("<svg/>", "Logo").mime_type(), Some("image/svg+xml"));
        assert_eq!(jpg("x", "Shot").mime_type(), Some("image/jpeg"));
    }
}
