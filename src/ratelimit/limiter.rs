//! Fixed-window rate limiter keyed by client identifier

use std::net::IpAddr;
use std::time::SystemTime;

use dashmap::DashMap;
use serde::Serialize;

use super::config::RateLimitConfig;

/// Result of a rate limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        remaining: u32,
        limit: u32,
        reset_at: i64,
    },
    /// Request is denied due to rate limiting
    Denied {
        retry_after: u64,
        limit: u32,
        reset_at: i64,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Counter for one client within the current window
#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    /// Unix milliseconds at which the window resets
    reset_at: i64,
}

/// Fixed-window rate limiter.
///
/// Each client key gets `max_requests` per window. Windows whose reset time
/// has passed are dropped by [`RateLimiter::cleanup_expired`].
pub struct RateLimiter {
    windows: DashMap<String, Window>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            config,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Current time in Unix milliseconds
    pub fn now_millis() -> i64 {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }

    /// Check and count a request from `ip`.
    pub fn check_ip(&self, ip: IpAddr) -> RateLimitResult {
        self.check_key(&ip.to_string())
    }

    /// Check and count a request for an arbitrary client key.
    pub fn check_key(&self, key: &str) -> RateLimitResult {
        self.check_at(key, Self::now_millis())
    }

    /// Check and count a request at an explicit point in time.
    pub fn check_at(&self, key: &str, now_ms: i64) -> RateLimitResult {
        let limit = self.config.max_requests;

        if !self.config.enabled {
            return RateLimitResult::Allowed {
                remaining: u32::MAX,
                limit: 0,
                reset_at: 0,
            };
        }

        let window_ms = self.config.window_ms();
        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            reset_at: now_ms.saturating_add(window_ms),
        });

        if now_ms >= entry.reset_at {
            entry.count = 0;
            entry.reset_at = now_ms.saturating_add(window_ms);
        }

        if entry.count < limit {
            entry.count += 1;
            RateLimitResult::Allowed {
                remaining: limit - entry.count,
                limit,
                reset_at: entry.reset_at,
            }
        } else {
            let wait_ms = (entry.reset_at - now_ms).max(0) as u64;
            RateLimitResult::Denied {
                retry_after: wait_ms.div_ceil(1000).max(1),
                limit,
                reset_at: entry.reset_at,
            }
        }
    }

    /// Remove windows that have already reset.
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_at(Self::now_millis())
    }

    pub fn cleanup_expired_at(&self, now_ms: i64) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, window| window.reset_at > now_ms);
        let removed = before.saturating_sub(self.windows.len());

        if removed > 0 {
            tracing::debug!(
                removed = removed,
                remaining = self.windows.len(),
                "Cleaned up expired rate limit windows"
            );
        }

        removed
    }

    pub fn stats(&self) -> RateLimiterStats {
        RateLimiterStats {
            enabled: self.config.enabled,
            tracked_clients: self.windows.len(),
            max_requests: self.config.max_requests,
            window_seconds: self.config.window_seconds,
        }
    }
}

/// Statistics about the rate limiter
#[derive(Debug, Clone, Serialize)]
pub struct RateLimiterStats {
    pub enabled: bool,
    pub tracked_clients: usize,
    pub max_requests: u32,
    pub window_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn limiter(max_requests: u32) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            enabled: true,
            max_requests,
            window_seconds: 60,
            ..Default::default()
        })
    }

    #[test]
    fn test_rate_limiter_disabled() {
        let limiter = RateLimiter::new(RateLimitConfig {
            enabled: false,
            max_requests: 1,
            ..Default::default()
        });
        let ip = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));

        for _ in 0..100 {
            assert!(limiter.check_ip(ip).is_allowed());
        }
        assert_eq!(limiter.stats().tracked_clients, 0);
    }

    #[test]
    fn test_window_limit() {
        let limiter = limiter(3);
        let now = 1_000_000;

        for expected_remaining in [2, 1, 0] {
            assert_eq!(
                limiter.check_at("10.0.0.1", now),
                RateLimitResult::Allowed {
                    remaining: expected_remaining,
                    limit: 3,
                    reset_at: now + 60_000,
                }
            );
        }

        assert_eq!(
            limiter.check_at("10.0.0.1", now + 30_500),
            RateLimitResult::Denied {
                retry_after: 30,
                limit: 3,
                reset_at: now + 60_000,
            }
        );
    }

    #[test]
    fn test_window_resets() {
        let limiter = limiter(1);
        let now = 5_000;

        assert!(limiter.check_at("k", now).is_allowed());
        assert!(!limiter.check_at("k", now + 59_999).is_allowed());
        assert!(limiter.check_at("k", now + 60_000).is_allowed());
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = limiter(1);

        assert!(limiter.check_at("a", 0).is_allowed());
        assert!(!limiter.check_at("a", 1).is_allowed());
        assert!(limiter.check_at("b", 1).is_allowed());
    }

    #[test]
    fn test_cleanup_expired_windows() {
        let limiter = limiter(5);

        limiter.check_at("old", 0);
        limiter.check_at("fresh", 50_000);

        assert_eq!(limiter.cleanup_expired_at(60_000), 1);
        assert_eq!(limiter.stats().tracked_clients, 1);
    }
}
