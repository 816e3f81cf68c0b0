#![no_main]

//! Arbitrary JSON through the listing normalizer.
//!
//! Records may be missing fields, carry the wrong types or repeat ids; the
//! normalizer must skip what it cannot read and never panic.

use libfuzzer_sys::fuzz_target;

use grievance::normalize::normalize_batch;

fuzz_target!(|data: &[u8]| {
    let value: serde_json::Value = match serde_json::from_slice(data) {
        Ok(v) => v,
        Err(_) => return,
    };
    let records = match value {
        serde_json::Value::Array(items) => items,
        other => vec![other],
    };
    let total = records.len();

    let batch = normalize_batch(records);
    assert_eq!(batch.complaints.len() + batch.skipped, total);

    let mut ids: Vec<&str> = batch.complaints.iter().map(|c| c.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), batch.complaints.len());
});
