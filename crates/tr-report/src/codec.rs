//! Attachment encoding.
//!
//! In self-contained mode every text-like attachment becomes a data URI and
//! media stays inline as base64. In linked mode payloads are written under
//! `assets/` next to the report and referenced by relative path.

use crate::error::{ReportError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tr_common::{Attachment, FilePayload, FormatType};

/// Directory, relative to the report, holding linked assets.
pub const ASSETS_DIR: &str = "assets";

/// Default upper bound on asset file names.
pub const DEFAULT_MAX_ASSET_FILENAME_LENGTH: usize = 255;

static NON_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w.]").expect("valid filename regex"));

/// Where encoded payloads end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetMode {
    /// Inline everything as data URIs.
    SelfContained,
    /// Write files to `<report_dir>/assets/`.
    Linked { report_dir: PathBuf },
}

/// An attachment after encoding, as stored in the report data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedExtra {
    pub format_type: FormatType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Data URI, relative href, external link, or raw HTML.
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl RenderedExtra {
    fn from_file(payload: &FilePayload, format_type: FormatType, content: String) -> Self {
        Self {
            format_type,
            name: Some(payload.name.clone()),
            content,
            mime_type: Some(payload.mime_type.clone()),
            extension: Some(payload.extension.clone()),
        }
    }
}

/// Encodes attachments for one report.
#[derive(Debug, Clone)]
pub struct AttachmentCodec {
    mode: AssetMode,
    max_filename_length: usize,
}

impl AttachmentCodec {
    pub fn new(mode: AssetMode, max_filename_length: usize) -> Self {
        Self {
            mode,
            max_filename_length,
        }
    }

    pub fn self_contained() -> Self {
        Self::new(AssetMode::SelfContained, DEFAULT_MAX_ASSET_FILENAME_LENGTH)
    }

    pub fn mode(&self) -> &AssetMode {
        &self.mode
    }

    /// Encode one attachment.
    ///
    /// `test_id` is the displayed id, `extra_index` the attachment's position
    /// in its record and `attempt` the record's attempt number; together they
    /// name the asset file in linked mode.
    pub fn encode(
        &self,
        attachment: &Attachment,
        test_id: &str,
        extra_index: usize,
        attempt: u32,
    ) -> Result<RenderedExtra> {
        let filename = |extension: &str| {
            asset_filename(
                test_id,
                extra_index,
                attempt,
                extension,
                self.max_filename_length,
            )
        };

        let rendered = match attachment {
            Attachment::Html { content } => RenderedExtra {
                format_type: FormatType::Html,
                name: None,
                content: content.clone(),
                mime_type: None,
                extension: None,
            },
            Attachment::Url { name, content } => RenderedExtra {
                format_type: FormatType::Url,
                name: Some(name.clone()),
                content: content.clone(),
                mime_type: None,
                extension: None,
            },
            Attachment::Text(payload) => {
                let content = self.data_content(
                    &payload.content,
                    &payload.mime_type,
                    &filename(&payload.extension),
                )?;
                RenderedExtra::from_file(payload, FormatType::Text, content)
            }
            Attachment::Json(payload) => {
                let text = serde_json::to_string(&payload.content)?;
                let content =
                    self.data_content(&text, &payload.mime_type, &filename(&payload.extension))?;
                RenderedExtra {
                    format_type: FormatType::Json,
                    name: Some(payload.name.clone()),
                    content,
                    mime_type: Some(payload.mime_type.clone()),
                    extension: Some(payload.extension.clone()),
                }
            }
            Attachment::Image(payload) | Attachment::Video(payload) => {
                let content = self.media_content(
                    &payload.content,
                    &payload.mime_type,
                    &filename(&payload.extension),
                )?;
                RenderedExtra::from_file(payload, attachment.format_type(), content)
            }
        };

        Ok(rendered)
    }

    /// Encode every attachment of a record in order.
    pub fn encode_all(
        &self,
        attachments: &[Attachment],
        test_id: &str,
        attempt: u32,
    ) -> Result<Vec<RenderedExtra>> {
        attachments
            .iter()
            .enumerate()
            .map(|(index, attachment)| self.encode(attachment, test_id, index, attempt))
            .collect()
    }

    fn data_content(&self, text: &str, mime_type: &str, asset_name: &str) -> Result<String> {
        match &self.mode {
            AssetMode::SelfContained => Ok(text_data_uri(mime_type, text)),
            AssetMode::Linked { report_dir } => write_asset(report_dir, asset_name, text.as_bytes()),
        }
    }

    fn media_content(&self, content: &str, mime_type: &str, asset_name: &str) -> Result<String> {
        let Some(bytes) = decode_base64(content) else {
            if matches!(self.mode, AssetMode::SelfContained) {
                warn!(resource = %content, "Self-contained report includes link to external resource");
            } else {
                debug!(resource = %content, "Media content is not base64; keeping as link");
            }
            return Ok(content.to_string());
        };

        match &self.mode {
            AssetMode::SelfContained => Ok(format!("data:{mime_type};base64,{content}")),
            AssetMode::Linked { report_dir } => write_asset(report_dir, asset_name, &bytes),
        }
    }
}

/// Replace every character that is neither a word character nor `.` with `_`.
pub fn sanitize_test_id(test_id: &str) -> String {
    NON_FILENAME_CHARS.replace_all(test_id, "_").into_owned()
}

/// `<sanitized id>_<extra index>_<attempt>.<extension>`, keeping only the
/// last `max_len` characters.
///
/// The slice is taken from the fully assembled name, so a small limit can cut
/// into the index or even the extension.
pub fn asset_filename(
    test_id: &str,
    extra_index: usize,
    attempt: u32,
    extension: &str,
    max_len: usize,
) -> String {
    let full = format!(
        "{}_{}_{}.{}",
        sanitize_test_id(test_id),
        extra_index,
        attempt,
        extension
    );
    let count = full.chars().count();
    if count <= max_len {
        full
    } else {
        full.chars().skip(count - max_len).collect()
    }
}

/// `data:<mime>;charset=utf-8;base64,<payload>`.
pub fn text_data_uri(mime_type: &str, text: &str) -> String {
    format!(
        "data:{mime_type};charset=utf-8;base64,{}",
        STANDARD.encode(text.as_bytes())
    )
}

/// A parsed `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    pub charset: Option<String>,
    pub data: Vec<u8>,
}

impl DataUri {
    /// Payload as UTF-8 text, if it is valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

/// Parse a base64 data URI as produced by this module.
pub fn decode_data_uri(uri: &str) -> Option<DataUri> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mut params = header.split(';');
    let mime_type = params.next()?.to_string();

    let mut charset = None;
    let mut is_base64 = false;
    for param in params {
        if param == "base64" {
            is_base64 = true;
        } else if let Some(value) = param.strip_prefix("charset=") {
            charset = Some(value.to_string());
        }
    }
    if !is_base64 {
        return None;
    }

    let data = STANDARD.decode(payload).ok()?;
    Some(DataUri {
        mime_type,
        charset,
        data,
    })
}

/// Strict base64 decode; empty input is not media.
fn decode_base64(content: &str) -> Option<Vec<u8>> {
    if content.is_empty() {
        return None;
    }
    STANDARD.decode(content).ok()
}

fn write_asset(report_dir: &Path, asset_name: &str, bytes: &[u8]) -> Result<String> {
    let dir = report_dir.join(ASSETS_DIR);
    fs::create_dir_all(&dir).map_err(|e| ReportError::write(&dir, e))?;

    let path = dir.join(asset_name);
    fs::write(&path, bytes).map_err(|e| ReportError::write(&path, e))?;
    debug!(path = %path.display(), bytes = bytes.len(), "Wrote asset");

    Ok(format!("{ASSETS_DIR}/{asset_name}"))
}
