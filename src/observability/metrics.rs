//! Metrics collection and exposition.
//!
//! # Metrics
//! - `reconciler_events_total` (counter): add/change/remove events by kind
//! - `reconciler_applies_total` (counter): apply outcomes (applied, rejected, cancelled)
//! - `reconciler_routing_table_endpoints` (gauge): descriptors in the published table
//! - `reconciler_routing_table_publishes_total` (counter): table publications

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_event(kind: &'static str) {
    ::metrics::counter!("reconciler_events_total", "kind" => kind).increment(1);
}

pub fn record_apply(outcome: &'static str) {
    ::metrics::counter!("reconciler_applies_total", "outcome" => outcome).increment(1);
}

pub fn record_routing_table(endpoints: usize) {
    ::metrics::gauge!("reconciler_routing_table_endpoints").set(endpoints as f64);
    ::metrics::counter!("reconciler_routing_table_publishes_total").increment(1);
}
