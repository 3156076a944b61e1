//! Rate limiting configuration

use serde::Deserialize;

/// Configuration for the preview rate limiter
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Requests allowed per client within one window
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Window length in seconds
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
    /// Interval between sweeps of expired windows, in seconds
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_max_requests() -> u32 {
    30 // 30 previews per window per client
}

fn default_window_seconds() -> u64 {
    60
}

fn default_cleanup_interval() -> u64 {
    60
}

/// Longest accepted window (one year); larger values are clamped.
pub const MAX_WINDOW_SECONDS: u64 = 365 * 24 * 60 * 60;

impl RateLimitConfig {
    pub fn window_ms(&self) -> i64 {
        let seconds = self.window_seconds.clamp(1, MAX_WINDOW_SECONDS);
        seconds.saturating_mul(1000) as i64
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_requests: default_max_requests(),
            window_seconds: default_window_seconds(),
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}
