//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): dispatched requests by method, status
//! - `dispatch_duration_seconds` (histogram): dispatch latency
//! - `cache_entries` (gauge): entries currently in the store
//! - `cache_promotions_total` (counter): opportunistic promotions
//! - `cache_evictions_total` (counter): rebalance evictions
//! - `cache_rebalance_total` (counter): completed rebalance passes
//! - `cache_rebalance_duration_seconds` (histogram): rebalance pass latency
//!
//! # Design Decisions
//! - Recorders are plain functions on the `metrics` facade; with no exporter
//!   installed they are no-ops
//! - The Prometheus exporter is opt-in via config and serves its own listener

use metrics::{counter, gauge, histogram};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    let result = metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install();
    match result {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one dispatched request.
pub fn record_dispatch(method: &str, status: u16, start: Instant) {
    counter!(
        "dispatch_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("dispatch_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_promotion() {
    counter!("cache_promotions_total").increment(1);
}

pub fn record_eviction(count: u64) {
    if count > 0 {
        counter!("cache_evictions_total").increment(count);
    }
}

pub fn record_cache_entries(count: usize) {
    gauge!("cache_entries").set(count as f64);
}

pub fn record_rebalance(duration: Duration) {
    counter!("cache_rebalance_total").increment(1);
    histogram!("cache_rebalance_duration_seconds").record(duration.as_secs_f64());
}
