//! HTML rendering of a report snapshot.

use crate::codec::RenderedExtra;
use crate::model::{InitialSort, ReportSnapshot, TestResult};
use chrono::{DateTime, Utc};
use tracing::info;
use tr_common::{FormatType, Outcome};
use tr_redact::display_value;

/// Stylesheet shipped with every report.
pub const DEFAULT_STYLES: &str = include_str!("../assets/style.css");

/// Link target of the stylesheet in linked mode.
pub const STYLESHEET_HREF: &str = "assets/style.css";

/// Renders snapshots into a single HTML document.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    styles: String,
    self_contained: bool,
}

impl ReportGenerator {
    /// `styles` is the full stylesheet: built-in rules followed by user CSS.
    pub fn new(styles: impl Into<String>, self_contained: bool) -> Self {
        Self {
            styles: styles.into(),
            self_contained,
        }
    }

    pub fn self_contained(&self) -> bool {
        self.self_contained
    }

    pub fn styles(&self) -> &str {
        &self.styles
    }

    /// Render the document. Minified in release builds.
    pub fn render(&self, snapshot: &ReportSnapshot, generated_at: DateTime<Utc>) -> String {
        let html = self.generate_html(snapshot, generated_at);

        let output = if cfg!(debug_assertions) {
            html
        } else {
            let cfg = minify_html::Cfg {
                minify_js: true,
                minify_css: true,
                ..Default::default()
            };
            String::from_utf8(minify_html::minify(html.as_bytes(), &cfg)).unwrap_or(html)
        };

        info!(
            bytes = output.len(),
            title = %snapshot.title,
            tests = snapshot.results().count(),
            "Report generated"
        );

        output
    }

    fn generate_html(&self, snapshot: &ReportSnapshot, generated_at: DateTime<Utc>) -> String {
        let title = html_escape(&snapshot.title);
        let stylesheet = if self.self_contained {
            format!("<style>\n{}\n</style>", self.styles)
        } else {
            format!(r#"<link href="{STYLESHEET_HREF}" rel="stylesheet" type="text/css"/>"#)
        };
        let data_json = serde_json::to_string(snapshot).unwrap_or_else(|_| "{}".to_string());

        format!(
            r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8"/>
    <title>{title}</title>
    <meta name="generator" content="testreport {version}">
    {stylesheet}
</head>
<body>
    <h1 id="title">{title}</h1>
    <p>Report generated on {date} at {time} by testreport v{version}</p>
    <div id="environment-header">
        <h2>Environment</h2>
    </div>
    <table id="environment">
{environment}
    </table>
    <div class="summary">
        <div class="summary__data">
            <h2>Summary</h2>
{prefix}
            <div class="additional-summary prefix"></div>
            <p class="run-count">{run_count}</p>
            <p class="filter">(Un)check the boxes to filter the results.</p>
            <div class="summary__counts">
{counts}
            </div>
{summary}
        </div>
    </div>
{postfix}
    <table id="results-table" data-initial-sort="{initial_sort}">
        <thead id="results-table-head">
            <tr>{header}</tr>
        </thead>
{rows}
    </table>
    <div id="data-container" data-jsonblob="{data_json}"></div>
</body>
</html>
"##,
            title = title,
            version = env!("CARGO_PKG_VERSION"),
            stylesheet = stylesheet,
            date = generated_at.format("%d-%b-%Y"),
            time = generated_at.format("%H:%M:%S"),
            environment = self.environment_rows(snapshot),
            prefix = fragments(&snapshot.additional_summary.prefix),
            run_count = html_escape(&snapshot.run_count_line()),
            counts = self.outcome_counts(snapshot),
            summary = fragments(&snapshot.additional_summary.summary),
            postfix = fragments(&snapshot.additional_summary.postfix),
            initial_sort = snapshot.initial_sort.as_str(),
            header = snapshot.results_table_header.cells().concat(),
            rows = self.result_rows(snapshot),
            data_json = html_escape(&data_json),
        )
    }

    fn environment_rows(&self, snapshot: &ReportSnapshot) -> String {
        snapshot
            .environment
            .iter()
            .map(|(key, value)| {
                let text = display_value(value);
                let cell = if text.starts_with("http") {
                    let href = html_escape(&text);
                    format!(r#"<a href="{href}" target="_blank">{href}</a>"#)
                } else {
                    html_escape(&text)
                };
                format!(
                    "        <tr>\n            <td>{}</td>\n            <td>{}</td>\n        </tr>",
                    html_escape(key),
                    cell
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn outcome_counts(&self, snapshot: &ReportSnapshot) -> String {
        Outcome::ALL
            .into_iter()
            .map(|outcome| {
                let count = snapshot.count(outcome);
                let label = snapshot
                    .outcomes
                    .get(&outcome)
                    .map_or(outcome.summary_label(), |c| c.label.as_str());
                let disabled = if count == 0 { " disabled" } else { "" };
                format!(
                    r#"                <input checked="true" class="filter" name="filter_checkbox" type="checkbox" data-test-result="{key}"{disabled}/><span class="{key}">{count} {label},</span>"#,
                    key = outcome.key(),
                    label = html_escape(label),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn result_rows(&self, snapshot: &ReportSnapshot) -> String {
        let columns = snapshot.results_table_header.len().max(1);
        sorted_results(snapshot)
            .into_iter()
            .map(|result| {
                let collapsed = if snapshot.render_collapsed.collapses(result.result) {
                    " collapsed"
                } else {
                    ""
                };
                format!(
                    r#"        <tbody class="results-table-row {key}{collapsed}" data-test-id="{id}">
            <tr class="collapsible">{cells}</tr>
            <tr class="extras-row">
                <td class="extra" colspan="{columns}">
                    <div class="extraHTML">{html}</div>
                    <div class="media">{media}</div>
                    <div class="logwrapper">
                        <div class="log">{log}</div>
                    </div>
                </td>
            </tr>
        </tbody>"#,
                    key = result.result.key(),
                    id = html_escape(&result.test_id),
                    cells = result.results_table_row.cells().concat(),
                    html = html_extras(&result.extras),
                    media = media_extras(&result.extras),
                    log = html_escape(&result.log),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Render a snapshot with the given stylesheet.
pub fn render(
    snapshot: &ReportSnapshot,
    styles: &str,
    self_contained: bool,
    generated_at: DateTime<Utc>,
) -> String {
    ReportGenerator::new(styles, self_contained).render(snapshot, generated_at)
}

/// Results in display order. The sort is stable, so ties keep arrival order.
pub fn sorted_results(snapshot: &ReportSnapshot) -> Vec<&TestResult> {
    let mut results: Vec<&TestResult> = snapshot.results().collect();
    match snapshot.initial_sort {
        InitialSort::Result => results.sort_by_key(|r| r.result.severity()),
        InitialSort::TestId => results.sort_by(|a, b| a.test_id.cmp(&b.test_id)),
        InitialSort::Duration => results.sort_by(|a, b| b.duration.total_cmp(&a.duration)),
        InitialSort::Original => {}
    }
    results
}

fn fragments(parts: &[String]) -> String {
    parts.concat()
}

fn html_extras(extras: &[RenderedExtra]) -> String {
    extras
        .iter()
        .filter(|extra| extra.format_type == FormatType::Html)
        .map(|extra| format!("<div>{}</div>", extra.content))
        .collect()
}

fn media_extras(extras: &[RenderedExtra]) -> String {
    extras
        .iter()
        .filter_map(|extra| {
            let src = html_escape(&extra.content);
            let name = html_escape(extra.name.as_deref().unwrap_or_default());
            match extra.format_type {
                FormatType::Image => Some(format!(
                    r#"<div class="media-container"><a href="{src}" target="_blank"><img src="{src}" alt="{name}"/></a></div>"#
                )),
                FormatType::Video => Some(format!(
                    r#"<div class="media-container"><video controls><source src="{src}" type="{}"></video></div>"#,
                    html_escape(extra.mime_type.as_deref().unwrap_or_default())
                )),
                _ => None,
            }
        })
        .collect()
}

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
