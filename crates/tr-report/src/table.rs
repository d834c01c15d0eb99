//! Results table rows and headers.
//!
//! Cells are HTML fragments. Collaborators reshape a row through
//! [`TableRowBuilder`] and the finalized [`TableRow`] is immutable.

use crate::codec::RenderedExtra;
use crate::generator::html_escape;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tr_common::Outcome;

/// Header cells of the default results table.
pub const DEFAULT_HEADER: [&str; 4] = [
    r#"<th class="sortable" data-column-type="result">Result</th>"#,
    r#"<th class="sortable" data-column-type="testId">Test</th>"#,
    r#"<th class="sortable" data-column-type="duration">Duration</th>"#,
    "<th>Links</th>",
];

static CELL_COLUMN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"col-(\w+)").expect("valid column regex"));
static CELL_CONTENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<td.*?>(.*?)</td>").expect("valid cell regex"));

/// An immutable, finalized list of cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableRow(Vec<String>);

impl TableRow {
    pub fn cells(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn default_header() -> Self {
        TableRow(DEFAULT_HEADER.iter().map(|c| c.to_string()).collect())
    }
}

/// Accumulates cells for a header or row before it is frozen.
#[derive(Debug, Clone, Default)]
pub struct TableRowBuilder {
    cells: Vec<String>,
}

impl TableRowBuilder {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Start from an existing row.
    pub fn from_row(row: &TableRow) -> Self {
        Self::new(row.0.clone())
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn append(&mut self, cell: impl Into<String>) -> &mut Self {
        self.cells.push(cell.into());
        self
    }

    /// Insert before `index`; indices past the end append.
    pub fn insert(&mut self, index: usize, cell: impl Into<String>) -> &mut Self {
        let index = index.min(self.cells.len());
        self.cells.insert(index, cell.into());
        self
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.cells.len()).then(|| self.cells.remove(index))
    }

    /// Drop every cell. A row left empty is removed from the report.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Freeze the cells; `None` when the row was emptied.
    pub fn finalize(self) -> Option<TableRow> {
        if self.cells.is_empty() {
            None
        } else {
            Some(TableRow(self.cells))
        }
    }
}

/// Default cells for one result: Result, Test, Duration, Links.
pub fn default_row(
    outcome: Outcome,
    display_id: &str,
    duration: &str,
    extras: &[RenderedExtra],
) -> TableRowBuilder {
    TableRowBuilder::new(vec![
        format!(r#"<td class="col-result">{}</td>"#, outcome.label()),
        format!(r#"<td class="col-testId">{}</td>"#, html_escape(display_id)),
        format!(r#"<td class="col-duration">{}</td>"#, html_escape(duration)),
        format!(r#"<td class="col-links">{}</td>"#, links_html(extras)),
    ])
}

/// Anchor tags for the link-type extras (json, text, url).
pub fn links_html(extras: &[RenderedExtra]) -> String {
    extras
        .iter()
        .filter(|extra| extra.format_type.is_link())
        .map(|extra| {
            format!(
                r#"<a target="_blank" href="{}" class="col-links__extra {}">{}</a>"#,
                html_escape(&extra.content),
                extra.format_type,
                html_escape(extra.name.as_deref().unwrap_or_default()),
            )
        })
        .collect()
}

/// Whether a header cell marks its column sortable.
pub fn is_sortable(header_cell: &str) -> bool {
    header_cell.contains("sortable")
}

/// Raw cell content of every sortable column, keyed by the cell's
/// `col-<name>` class.
pub fn extract_sortable(header: &TableRow, row: &TableRow) -> IndexMap<String, String> {
    let mut values = IndexMap::new();
    for (index, cell) in row.cells().iter().enumerate() {
        let sortable = header.cells().get(index).is_some_and(|h| is_sortable(h));
        if !sortable {
            continue;
        }
        let name = CELL_COLUMN.captures(cell).and_then(|c| c.get(1));
        let content = CELL_CONTENT.captures(cell).and_then(|c| c.get(1));
        if let (Some(name), Some(content)) = (name, content) {
            values.insert(name.as_str().to_string(), content.as_str().to_string());
        }
    }
    values
}

/// `< 1 s` as rounded milliseconds, otherwise `HH:MM:SS`.
pub fn format_duration(seconds: f64) -> String {
    if seconds < 1.0 {
        return format!("{} ms", (seconds * 1000.0).round() as u64);
    }
    let hours = (seconds / 3600.0).floor() as u64;
    let remaining = seconds % 3600.0;
    let minutes = (remaining / 60.0).floor() as u64;
    let secs = (remaining % 60.0).round() as u64;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}
