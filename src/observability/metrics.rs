//! Metrics collection and exposition.
//!
//! # Metrics
//! - `app_lifecycle_phase_seconds` (histogram): time spent in each startup phase
//! - `app_datasource_up` (gauge): 1 while a datastore handle is live
//! - `app_entities_provisioned_total` (counter): entities provisioned at startup
//!
//! Recording is a no-op until an exporter is installed.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::config::DbKind;
use crate::lifecycle::LifecycleState;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_phase(phase: LifecycleState, started: Instant) {
    metrics::histogram!("app_lifecycle_phase_seconds", "phase" => phase.as_str())
        .record(started.elapsed().as_secs_f64());
}

pub fn set_datasource_up(kind: DbKind, up: bool) {
    metrics::gauge!("app_datasource_up", "kind" => kind.as_str()).set(if up { 1.0 } else { 0.0 });
}

pub fn record_entities_provisioned(kind: DbKind, count: usize) {
    metrics::counter!("app_entities_provisioned_total", "kind" => kind.as_str())
        .increment(count as u64);
}
