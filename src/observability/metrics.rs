//! Metrics collection and exposition.
//!
//! # Metrics
//! - `docs_requests_total` (counter): HTTP responses by status
//! - `docs_request_duration_seconds` (histogram): handler latency
//! - `docs_resolutions_total` (counter): outcomes by outcome, method
//! - `docs_redirects_total` (counter): redirects by reason
//! - `docs_seen_hosts_total` (counter): first sightings of public subdomains

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(status: u16, start: Instant) {
    metrics::counter!("docs_requests_total", "status" => status.to_string()).increment(1);
    metrics::histogram!("docs_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_resolution(outcome: &'static str, method: &'static str) {
    metrics::counter!("docs_resolutions_total", "outcome" => outcome, "method" => method).increment(1);
}

pub fn record_redirect(reason: &'static str) {
    metrics::counter!("docs_redirects_total", "reason" => reason).increment(1);
}

pub fn record_seen_host() {
    metrics::counter!("docs_seen_hosts_total").increment(1);
}
