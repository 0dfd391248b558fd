//! Metrics collection and exposition.
//!
//! # Metrics
//! - `turnout_requests_total` (counter): admission decisions by `outcome`
//!
//! Without an installed recorder the counters are no-ops.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// How the interceptor disposed of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Maintenance inactive.
    Forwarded,
    /// Maintenance active, request matched an allow-list.
    Exempt,
    /// Maintenance response served.
    Intercepted,
    /// Settings or template failure.
    Error,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Forwarded => "forwarded",
            Outcome::Exempt => "exempt",
            Outcome::Intercepted => "intercepted",
            Outcome::Error => "error",
        }
    }
}

/// Count one admission decision.
pub fn record_admission(outcome: Outcome) {
    ::metrics::counter!("turnout_requests_total", "outcome" => outcome.as_str()).increment(1);
}

/// Start the Prometheus exporter on `addr`. Must be called inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}
