//! Metrics collection and exposition.
//!
//! # Metrics
//! - `genai_proxy_requests_total` (counter): requests by method, status
//! - `genai_proxy_request_duration_seconds` (histogram): latency by method
//!
//! Recording is a no-op until a recorder is installed, so tests and runs
//! with metrics disabled pay nothing.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
///
/// Must be called from within the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start_time: Instant) {
    let elapsed = start_time.elapsed().as_secs_f64();
    ::metrics::counter!(
        "genai_proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!(
        "genai_proxy_request_duration_seconds",
        "method" => method.to_string()
    )
    .record(elapsed);
}
