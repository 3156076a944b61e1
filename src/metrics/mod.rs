//! Prometheus metrics for the preview service.
//!
//! - Preview metrics (renders by source, render latency)
//! - Rate limiting metrics
//! - Content storage metrics (backend errors, branding cache)
//! - Broadcast metrics
//! - HTTP API metrics

mod helpers;

pub use helpers::{
    encode_metrics, BroadcastMetrics, ContentMetrics, HttpMetrics, PreviewMetrics,
    RateLimitMetrics,
};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, register_int_gauge,
    HistogramVec, IntCounter, IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "comms";

lazy_static! {
    // ============================================================================
    // Preview Metrics
    // ============================================================================

    /// Previews rendered, by source document kind
    pub static ref PREVIEW_RENDERS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_preview_renders_total", METRIC_PREFIX),
        "Total previews rendered",
        &["source"]
    ).unwrap();

    /// Preview requests that failed, by reason
    pub static ref PREVIEW_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_preview_failures_total", METRIC_PREFIX),
        "Total preview requests that failed",
        &["reason"]
    ).unwrap();

    /// Time spent rendering (excluding content lookups)
    pub static ref PREVIEW_RENDER_LATENCY: HistogramVec = register_histogram_vec!(
        format!("{}_preview_render_latency_seconds", METRIC_PREFIX),
        "Preview render latency in seconds",
        &["source"],
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]
    ).unwrap();

    // ============================================================================
    // Rate Limiting Metrics
    // ============================================================================

    /// Requests allowed by rate limiter
    pub static ref RATELIMIT_ALLOWED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_ratelimit_allowed_total", METRIC_PREFIX),
        "Total requests allowed by rate limiter",
        &["route"]
    ).unwrap();

    /// Requests denied by rate limiter
    pub static ref RATELIMIT_DENIED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_ratelimit_denied_total", METRIC_PREFIX),
        "Total requests denied by rate limiter",
        &["route"]
    ).unwrap();

    /// Clients with a live rate-limit window
    pub static ref RATELIMIT_TRACKED_CLIENTS: IntGauge = register_int_gauge!(
        format!("{}_ratelimit_tracked_clients", METRIC_PREFIX),
        "Clients currently tracked by the rate limiter"
    ).unwrap();

    /// Windows removed by the sweep task
    pub static ref RATELIMIT_EVICTED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_ratelimit_evicted_total", METRIC_PREFIX),
        "Total expired rate-limit windows evicted"
    ).unwrap();

    // ============================================================================
    // Content Metrics
    // ============================================================================

    /// Content backend errors
    pub static ref CONTENT_BACKEND_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_content_backend_errors_total", METRIC_PREFIX),
        "Total content backend operation errors",
        &["operation"]
    ).unwrap();

    /// Default branding cache hits
    pub static ref BRANDING_CACHE_HITS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_branding_cache_hits_total", METRIC_PREFIX),
        "Total default branding cache hits"
    ).unwrap();

    /// Default branding cache misses
    pub static ref BRANDING_CACHE_MISSES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_branding_cache_misses_total", METRIC_PREFIX),
        "Total default branding cache misses"
    ).unwrap();

    // ============================================================================
    // Broadcast Metrics
    // ============================================================================

    /// Broadcasts triggered, by target kind and outcome
    pub static ref BROADCASTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_broadcasts_total", METRIC_PREFIX),
        "Total broadcasts triggered",
        &["target", "status"]
    ).unwrap();

    /// Broadcast records held in history
    pub static ref BROADCAST_HISTORY_SIZE: IntGauge = register_int_gauge!(
        format!("{}_broadcast_history_size", METRIC_PREFIX),
        "Broadcast records currently held in history"
    ).unwrap();

    // ============================================================================
    // HTTP API Metrics
    // ============================================================================

    /// HTTP request counter by method and path
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_http_requests_total", METRIC_PREFIX),
        "Total HTTP requests",
        &["method", "path", "status"]
    ).unwrap();

    /// HTTP request latency
    pub static ref HTTP_REQUEST_LATENCY: HistogramVec = register_histogram_vec!(
        format!("{}_http_request_latency_seconds", METRIC_PREFIX),
        "HTTP request latency in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_metrics() {
        // lazy_static metrics register on first access
        PREVIEW_RENDERS_TOTAL.with_label_values(&["template"]).inc();

        let output = encode_metrics().unwrap();
        assert!(output.contains("comms_preview_renders_total"));
    }

    #[test]
    fn test_gauges() {
        RATELIMIT_TRACKED_CLIENTS.set(3);
        BROADCAST_HISTORY_SIZE.set(10);
        // Just verify no panics
    }
}
