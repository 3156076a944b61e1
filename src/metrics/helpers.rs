//! Metrics helper structs for convenient metric recording

use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use super::{
    BRANDING_CACHE_HITS_TOTAL, BRANDING_CACHE_MISSES_TOTAL, BROADCASTS_TOTAL,
    BROADCAST_HISTORY_SIZE, CONTENT_BACKEND_ERRORS_TOTAL, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_LATENCY, PREVIEW_FAILURES_TOTAL, PREVIEW_RENDERS_TOTAL, PREVIEW_RENDER_LATENCY,
    RATELIMIT_ALLOWED_TOTAL, RATELIMIT_DENIED_TOTAL, RATELIMIT_EVICTED_TOTAL,
    RATELIMIT_TRACKED_CLIENTS,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording preview metrics
pub struct PreviewMetrics;

impl PreviewMetrics {
    /// Record a rendered preview and how long rendering took
    pub fn record_render(source: &str, elapsed: Duration) {
        PREVIEW_RENDERS_TOTAL.with_label_values(&[source]).inc();
        PREVIEW_RENDER_LATENCY
            .with_label_values(&[source])
            .observe(elapsed.as_secs_f64());
    }

    pub fn record_failure(reason: &str) {
        PREVIEW_FAILURES_TOTAL.with_label_values(&[reason]).inc();
    }
}

/// Helper struct for recording rate limit metrics
pub struct RateLimitMetrics;

impl RateLimitMetrics {
    /// Record an allowed preview request
    pub fn record_preview_allowed() {
        RATELIMIT_ALLOWED_TOTAL.with_label_values(&["preview"]).inc();
    }

    /// Record a denied preview request
    pub fn record_preview_denied() {
        RATELIMIT_DENIED_TOTAL.with_label_values(&["preview"]).inc();
    }

    /// Record a sweep of expired windows
    pub fn record_sweep(evicted: usize, tracked: usize) {
        RATELIMIT_EVICTED_TOTAL.inc_by(evicted as u64);
        RATELIMIT_TRACKED_CLIENTS.set(tracked as i64);
    }
}

/// Helper struct for recording content storage metrics
pub struct ContentMetrics;

impl ContentMetrics {
    pub fn record_backend_error(operation: &str) {
        CONTENT_BACKEND_ERRORS_TOTAL
            .with_label_values(&[operation])
            .inc();
    }

    pub fn record_branding_cache_hit() {
        BRANDING_CACHE_HITS_TOTAL.inc();
    }

    pub fn record_branding_cache_miss() {
        BRANDING_CACHE_MISSES_TOTAL.inc();
    }
}

/// Helper struct for recording broadcast metrics
pub struct BroadcastMetrics;

impl BroadcastMetrics {
    pub fn record_broadcast(target: &str, status: &str) {
        BROADCASTS_TOTAL.with_label_values(&[target, status]).inc();
    }

    pub fn set_history_size(size: usize) {
        BROADCAST_HISTORY_SIZE.set(size as i64);
    }
}

/// Helper struct for recording HTTP metrics
pub struct HttpMetrics;

impl HttpMetrics {
    pub fn record_request(method: &str, path: &str, status: u16, elapsed: Duration) {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&[method, path, &status.to_string()])
            .inc();
        HTTP_REQUEST_LATENCY
            .with_label_values(&[method, path])
            .observe(elapsed.as_secs_f64());
    }
}
