//! Metrics collection and exposition.
//!
//! # Metrics
//! - `keyauth_resolutions_total` (counter): resolutions by outcome
//! - `keyauth_decisions_total` (counter): allow/deny by required level
//! - `keyauth_secret_store_fetches_total` (counter): fetches by kind and result
//! - `keyauth_secret_store_fetch_duration_seconds` (histogram): fetch latency by kind
//!
//! Recording is a no-op until a recorder is installed with [`init_metrics`].

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_resolution(outcome: &'static str) {
    counter!("keyauth_resolutions_total", "outcome" => outcome).increment(1);
}

pub fn record_decision(decision: &'static str, required: &'static str) {
    counter!("keyauth_decisions_total", "decision" => decision, "required" => required).increment(1);
}

pub fn record_secret_fetch(kind: &'static str, ok: bool, start: Instant) {
    let result = if ok { "ok" } else { "error" };
    counter!("keyauth_secret_store_fetches_total", "kind" => kind, "result" => result).increment(1);
    histogram!("keyauth_secret_store_fetch_duration_seconds", "kind" => kind)
        .record(start.elapsed().as_secs_f64());
}
