//! Prometheus metrics exposition
//!
//! Service-level metrics (DAM client metrics live in `dam_client::metrics`):
//!
//! - `dam_session_invalidations_total` (counter): label `cause`
//! - `docarts_route_errors_total` (counter): labels `route`, `kind`
//! - `dam_request_duration_seconds` is given histogram buckets here

use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Bucket boundaries for DAM request latency, 5ms up to the 5s default
/// timeout and a little beyond.
const DURATION_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

fn builder() -> Result<PrometheusBuilder, BuildError> {
    PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full("dam_request_duration_seconds".to_string()),
        DURATION_BUCKETS,
    )
}

/// Install the global Prometheus recorder and return a handle for `/metrics`.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    builder()?.install_recorder()
}

/// Record a dropped session by cause.
pub fn record_invalidation(cause: &'static str) {
    metrics::counter!("dam_session_invalidations_total", "cause" => cause).increment(1);
}

/// Record a route that answered with an error (or an auth redirect).
pub fn record_route_error(route: &'static str, kind: &'static str) {
    metrics::counter!("docarts_route_errors_total", "route" => route, "kind" => kind)
        .increment(1);
}
