//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (requests, gate decisions, audit delivery)
//! - Expose a Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by action and status
//! - `gateway_request_duration_seconds` (histogram): gate latency by action
//! - `gateway_rate_limited_total` (counter): 429s by reason
//! - `gateway_auth_failures_total` (counter): 401s by reason
//! - `gateway_audit_failures_total` (counter): dropped audit entries
//! - `gateway_lockout_records` (gauge): live lockout entries after a sweep

use std::net::SocketAddr;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and scrape endpoint.
///
/// Failure to bind is logged and the gateway keeps running without
/// metrics exposition.
pub fn init_metrics(address: SocketAddr) {
    match PrometheusBuilder::new()
        .with_http_listener(address)
        .install()
    {
        Ok(()) => tracing::info!(%address, "Metrics endpoint listening"),
        Err(err) => tracing::error!(error = %err, "Failed to install metrics exporter"),
    }
}

/// Record a completed request by gate action and response status.
pub fn record_request(action: &str, status: u16) {
    counter!(
        "gateway_requests_total",
        "action" => action.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record how long the gate held a request, handler time included.
pub fn record_request_duration(action: &str, seconds: f64) {
    histogram!(
        "gateway_request_duration_seconds",
        "action" => action.to_string()
    )
    .record(seconds);
}

/// Record a request rejected by the rate limiter.
pub fn record_rate_limited(reason: &'static str) {
    counter!("gateway_rate_limited_total", "reason" => reason).increment(1);
}

/// Record a request rejected by bearer validation.
pub fn record_auth_failure(reason: &'static str) {
    counter!("gateway_auth_failures_total", "reason" => reason).increment(1);
}

/// Record an audit entry that could not be delivered to the log store.
pub fn record_audit_failure() {
    counter!("gateway_audit_failures_total").increment(1);
}

/// Record the number of lockout entries surviving a sweep.
pub fn record_lockout_records(count: usize) {
    gauge!("gateway_lockout_records").set(count as f64);
}
