//! Captured-output formatting for the per-test log panel.

use tr_common::{LogSection, PhaseEvent};

/// Placeholder shown when a record has no log output at all.
pub const NO_LOG_OUTPUT: &str = "No log output captured.";

/// Width of section header lines.
pub const SECTION_WIDTH: usize = 80;

/// `----- Captured stdout call -----` centred to [`SECTION_WIDTH`] columns.
pub fn section_header(header: &str) -> String {
    format!("{:-^width$}", format!(" {header} "), width = SECTION_WIDTH)
}

/// Log chunks contributed by one phase event.
///
/// The failure text comes first. Captured sections are dropped for rerun
/// attempts, whose panel only shows why the attempt failed.
pub fn phase_log(event: &PhaseEvent) -> Vec<String> {
    let mut chunks = Vec::new();
    if let Some(text) = event.long_representation.as_deref().filter(|t| !t.is_empty()) {
        chunks.push(format!("{text}\n"));
    }
    if !event.is_rerun() {
        for section in &event.log_sections {
            push_section(&mut chunks, section);
        }
    }
    chunks
}

fn push_section(chunks: &mut Vec<String>, section: &LogSection) {
    chunks.push(format!("{}\n{}", section_header(&section.header), section.body));
    // Logging sections are followed by blank spacer lines.
    if section.header.contains("log") {
        chunks.push(String::new());
        if section.header.contains("call") {
            chunks.push(String::new());
        }
    }
}

/// Join chunks into the final log text, stripping terminal escape codes.
pub fn join_log(chunks: &[String]) -> String {
    if chunks.is_empty() {
        return NO_LOG_OUTPUT.to_string();
    }
    strip_ansi_escapes::strip_str(chunks.join("\n"))
}
