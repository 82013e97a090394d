//! Prometheus metrics for scan throughput and failure tracking.
//!
//! This module provides metrics for:
//! - Universe rebuilds and size
//! - Quote lookup and scan failures
//! - Alerts emitted and notification outcomes
//! - HTTP request and batch latency

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{debug, info};

// === Metric Name Constants ===

/// Universe build latency metric name.
pub const METRIC_UNIVERSE_BUILD_LATENCY: &str = "universe_build_latency_ms";
/// Scan batch latency metric name.
pub const METRIC_SCAN_BATCH_LATENCY: &str = "scan_batch_latency_ms";
/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// Universe size gauge metric name.
pub const METRIC_UNIVERSE_SIZE: &str = "universe_size";
/// Universe rebuilds counter metric name.
pub const METRIC_UNIVERSE_REBUILDS: &str = "universe_rebuilds_total";
/// Listing symbols counter metric name.
pub const METRIC_LISTING_SYMBOLS: &str = "listing_symbols_total";
/// Quote failures counter metric name.
pub const METRIC_QUOTE_FAILURES: &str = "quote_failures_total";
/// Tickers scanned counter metric name.
pub const METRIC_TICKERS_SCANNED: &str = "tickers_scanned_total";
/// Scan failures counter metric name.
pub const METRIC_SCAN_FAILURES: &str = "scan_failures_total";
/// Alerts emitted counter metric name.
pub const METRIC_ALERTS_EMITTED: &str = "alerts_emitted_total";
/// Notifications sent counter metric name.
pub const METRIC_NOTIFICATIONS_SENT: &str = "notifications_sent_total";
/// Notifications failed counter metric name.
pub const METRIC_NOTIFICATIONS_FAILED: &str = "notifications_failed_total";

/// Install the Prometheus exporter on `0.0.0.0:port`.
///
/// Must be called from within a tokio runtime.
pub fn install_exporter(port: u16) -> Result<(), String> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("failed to install Prometheus exporter: {}", e))?;
    info!("Metrics exporter listening on {}", addr);
    Ok(())
}

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    // Latency histograms
    describe_histogram!(
        METRIC_UNIVERSE_BUILD_LATENCY,
        "Universe rebuild latency in milliseconds"
    );
    describe_histogram!(
        METRIC_SCAN_BATCH_LATENCY,
        "Scan batch latency in milliseconds"
    );
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );

    describe_gauge!(METRIC_UNIVERSE_SIZE, "Tickers in the current universe");

    // Counters
    describe_counter!(
        METRIC_UNIVERSE_REBUILDS,
        "Total number of universe rebuilds"
    );
    describe_counter!(
        METRIC_LISTING_SYMBOLS,
        "Total number of symbols read from listings"
    );
    describe_counter!(
        METRIC_QUOTE_FAILURES,
        "Total number of quote lookups that failed"
    );
    describe_counter!(METRIC_TICKERS_SCANNED, "Total number of tickers scanned");
    describe_counter!(
        METRIC_SCAN_FAILURES,
        "Total number of ticker scans that failed"
    );
    describe_counter!(METRIC_ALERTS_EMITTED, "Total number of alerts emitted");
    describe_counter!(
        METRIC_NOTIFICATIONS_SENT,
        "Total number of notifications delivered"
    );
    describe_counter!(
        METRIC_NOTIFICATIONS_FAILED,
        "Total number of notifications that failed"
    );

    debug!("Metrics initialized");
}

/// Record HTTP request latency.
pub fn record_http_latency(start: Instant, endpoint: &str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_HTTP_REQUEST_LATENCY, "endpoint" => endpoint.to_string()).record(latency_ms);
}

/// Set the universe size gauge.
pub fn set_universe_size(size: usize) {
    gauge!(METRIC_UNIVERSE_SIZE).set(size as f64);
}

/// Increment universe rebuilds counter.
pub fn inc_universe_rebuilds() {
    counter!(METRIC_UNIVERSE_REBUILDS).increment(1);
}

/// Add to the listing symbols counter.
pub fn add_listing_symbols(count: usize) {
    counter!(METRIC_LISTING_SYMBOLS).increment(count as u64);
}

/// Increment quote failures counter.
pub fn inc_quote_failures() {
    counter!(METRIC_QUOTE_FAILURES).increment(1);
}

/// Increment tickers scanned counter.
pub fn inc_tickers_scanned() {
    counter!(METRIC_TICKERS_SCANNED).increment(1);
}

/// Increment scan failures counter.
pub fn inc_scan_failures() {
    counter!(METRIC_SCAN_FAILURES).increment(1);
}

/// Increment alerts emitted counter.
pub fn inc_alerts_emitted() {
    counter!(METRIC_ALERTS_EMITTED).increment(1);
}

/// Increment notifications sent counter.
pub fn inc_notifications_sent() {
    counter!(METRIC_NOTIFICATIONS_SENT).increment(1);
}

/// Increment notifications failed counter.
pub fn inc_notifications_failed() {
    counter!(METRIC_NOTIFICATIONS_FAILED).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let latency_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        histogram!(self.metric_name).record(latency_ms);
    }
}

/// Create a latency timer for a universe rebuild.
pub fn timer_universe_build() -> LatencyTimer {
    LatencyTimer::new(METRIC_UNIVERSE_BUILD_LATENCY)
}

/// Create a latency timer for a scan batch.
pub fn timer_scan_batch() -> LatencyTimer {
    LatencyTimer::new(METRIC_SCAN_BATCH_LATENCY)
}
