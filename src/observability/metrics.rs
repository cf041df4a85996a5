//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): responses written, by method and status
//! - `http_request_duration_seconds` (histogram): read-to-write latency
//! - `http_connection_errors_total` (counter): connections closed without a
//!   response, by error kind
//!
//! Without an installed recorder every call is a no-op. Label values come
//! from fixed sets so clients cannot create new series.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::http::request::Method;

/// Install the Prometheus recorder with its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Label for `method`; every unsupported token shares one series.
pub fn method_label(method: &Method) -> &'static str {
    match method {
        Method::Get => "GET",
        Method::Post => "POST",
        Method::Other(_) => "OTHER",
    }
}

pub fn record_request(method: &Method, status: u16, started: Instant) {
    ::metrics::counter!(
        "http_requests_total",
        "method" => method_label(method),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("http_request_duration_seconds").record(started.elapsed().as_secs_f64());
}

pub fn record_connection_error(kind: &'static str) {
    ::metrics::counter!("http_connection_errors_total", "kind" => kind).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_methods_share_a_label() {
        assert_eq!(method_label(&Method::Get), "GET");
        assert_eq!(method_label(&Method::Post), "POST");
        assert_eq!(method_label(&Method::from("DELETE1")), "OTHER");
        assert_eq!(method_label(&Method::from("DELETE2")), "OTHER");
    }
}
