//! JSON output for a capture.
//!
//! The snapshot uses the same shape as the history file so scripts can reuse
//! one parser for both.

use serde::Serialize;

use crate::capture::Capture;
use crate::error::Result;
use crate::snapshot::Snapshot;

#[derive(Serialize)]
struct JsonCapture<'a> {
    snapshot: &'a Snapshot,
    failures: Vec<String>,
    saved: bool,
}

pub fn render(capture: &Capture) -> Result<String> {
    let report = JsonCapture {
        snapshot: &capture.snapshot,
        failures: capture.failures.iter().map(|f| f.to_string()).collect(),
        saved: capture.persist_error.is_none(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
