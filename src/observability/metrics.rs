//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gatekeeper_requests_total` (counter): decisions by outcome
//! - `gatekeeper_rate_limited_total` (counter): 429s by traffic class
//! - `gatekeeper_rate_limit_records` (gauge): records held after the last sweep
//! - `gatekeeper_sweep_evictions_total` (counter): records purged by the sweeper
//! - `gatekeeper_upstream_requests_total` (counter): forwarded requests by status
//! - `gatekeeper_upstream_duration_seconds` (histogram): upstream latency
//!
//! Recording is a no-op until a recorder is installed, so tests need no setup.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_outcome(outcome: &'static str) {
    counter!("gatekeeper_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_rate_limited(class: &'static str) {
    counter!("gatekeeper_rate_limited_total", "class" => class).increment(1);
}

pub fn record_sweep(evicted: usize, remaining: usize) {
    counter!("gatekeeper_sweep_evictions_total").increment(evicted as u64);
    gauge!("gatekeeper_rate_limit_records").set(remaining as f64);
}

pub fn record_upstream(status: u16, start: Instant) {
    counter!("gatekeeper_upstream_requests_total", "status" => status.to_string()).increment(1);
    histogram!("gatekeeper_upstream_duration_seconds").record(start.elapsed().as_secs_f64());
}
