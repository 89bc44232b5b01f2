//! Request metrics for DAM calls
//!
//! - `dam_requests_total` (counter): labels `client`, `status`
//! - `dam_request_duration_seconds` (histogram): label `client`
//! - `dam_request_failures_total` (counter): labels `client`, `kind`
//!
//! Calls are no-ops until a recorder is installed by the binary.

/// Record a completed request (any HTTP status).
pub fn record_request(client: &'static str, status: u16, duration_secs: f64) {
    metrics::counter!("dam_requests_total", "client" => client, "status" => status.to_string())
        .increment(1);
    metrics::histogram!("dam_request_duration_seconds", "client" => client).record(duration_secs);
}

/// Record a request that failed before or after reaching the provider.
pub fn record_failure(client: &'static str, kind: &'static str) {
    metrics::counter!("dam_request_failures_total", "client" => client, "kind" => kind)
        .increment(1);
}
