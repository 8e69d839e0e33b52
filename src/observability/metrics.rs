//! Metrics collection.
//!
//! # Metrics
//! - `akinator_directory_fetch_total` (counter): directory fetches by outcome
//! - `akinator_cached_servers` (gauge): live entries in the server cache
//! - `akinator_probe_total` (counter): health probes by outcome
//! - `akinator_server_evictions_total` (counter): servers removed after a failed probe
//! - `akinator_request_duration_seconds` (histogram): transport latency by status

use std::time::Duration;

pub fn record_directory_fetch(outcome: &'static str) {
    metrics::counter!("akinator_directory_fetch_total", "outcome" => outcome).increment(1);
}

pub fn record_cache_size(size: usize) {
    metrics::gauge!("akinator_cached_servers").set(size as f64);
}

pub fn record_probe(healthy: bool) {
    let outcome = if healthy { "healthy" } else { "unhealthy" };
    metrics::counter!("akinator_probe_total", "outcome" => outcome).increment(1);
}

pub fn record_eviction() {
    metrics::counter!("akinator_server_evictions_total").increment(1);
}

/// `status` is 0 when the request failed before a response arrived.
pub fn record_request(status: u16, elapsed: Duration) {
    metrics::histogram!("akinator_request_duration_seconds", "status" => status.to_string())
        .record(elapsed.as_secs_f64());
}
