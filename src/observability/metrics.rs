//! Metrics collection and exposition.
//!
//! # Metrics
//! - `testupstream_requests_total` (counter): requests by status, response type
//! - `testupstream_request_duration_seconds` (histogram): time to response head
//! - `testupstream_frames_total` (counter): streamed frames by response type
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::encoding::ResponseType;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request head.
pub fn record_request(status: u16, response_type: ResponseType, start: Instant) {
    metrics::counter!(
        "testupstream_requests_total",
        "status" => status.to_string(),
        "response_type" => response_type.as_str()
    )
    .increment(1);

    metrics::histogram!(
        "testupstream_request_duration_seconds",
        "response_type" => response_type.as_str()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one streamed frame.
pub fn record_frame(response_type: ResponseType) {
    metrics::counter!("testupstream_frames_total", "response_type" => response_type.as_str())
        .increment(1);
}
