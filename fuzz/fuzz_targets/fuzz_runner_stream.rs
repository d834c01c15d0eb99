//! Fuzz target for the runner stream.
//!
//! Feeds arbitrary lines through message parsing, report normalization and
//! the aggregator. Nothing may panic, and every record the aggregator emits
//! must carry the id of an event it was given.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tr_core::adapter::{parse_line, to_phase_event, RunnerMessage};
use tr_report::TestRecordAggregator;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let mut aggregator = TestRecordAggregator::new();
    let mut seen = Vec::new();
    let mut records = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let Ok(Some(RunnerMessage::Report(report))) = parse_line(index + 1, line) else {
            continue;
        };
        let Ok(event) = to_phase_event(report) else {
            continue;
        };
        seen.push(event.test_id.clone());
        records.extend(aggregator.ingest(event));
        records.extend(aggregator.take_displaced());
    }
    records.extend(aggregator.finish());

    for record in &records {
        assert!(seen.contains(&record.test_id));
    }
});
