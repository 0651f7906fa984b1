// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for rep-index.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The embedding application is responsible for choosing the exporter.
//!
//! # Metric Naming Convention
//! - `rep_index_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `match`: exact, pattern
//! - `composition`: and, or, single (after the single-term override)
//! - `status`: success, or an error kind (`not_found`, `store_failure`, ...)

use metrics::{counter, histogram};
use std::time::{Duration, Instant};

/// Record one representation encoded
pub fn record_encode() {
    counter!("rep_index_encodes_total").increment(1);
}

/// Record a field value that contains the delimiter
pub fn record_delimiter_collision(field: &'static str) {
    counter!("rep_index_delimiter_collisions_total", "field" => field).increment(1);
}

/// Record a search attempt and its outcome
pub fn record_search(match_mode: &str, composition: &str, status: &str) {
    counter!(
        "rep_index_searches_total",
        "match" => match_mode.to_string(),
        "composition" => composition.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record search latency
pub fn record_search_latency(match_mode: &str, duration: Duration) {
    histogram!(
        "rep_index_search_seconds",
        "match" => match_mode.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record number of records a search returned
pub fn record_search_results(count: usize) {
    histogram!("rep_index_search_results").record(count as f64);
}

/// Record a resync and its outcome
pub fn record_resync(status: &str) {
    counter!("rep_index_resyncs_total", "status" => status.to_string()).increment(1);
}

/// Record resync latency (read-back + write-back)
pub fn record_resync_latency(duration: Duration) {
    histogram!("rep_index_resync_seconds").record(duration.as_secs_f64());
}

/// A timing guard that records resync latency on drop
pub struct ResyncTimer {
    start: Instant,
}

impl ResyncTimer {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }
}

impl Drop for ResyncTimer {
    fn drop(&mut self) {
        record_resync_latency(self.start.elapsed());
    }
}
