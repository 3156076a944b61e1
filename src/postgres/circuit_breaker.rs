//! Circuit breaker guarding the content database

use std::sync::atomic::{AtomicI64, AtomicU32, AtomicU8, Ordering};
use std::time::SystemTime;

use serde::Serialize;

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CircuitState {
    Closed = 0,
    Open = 1,
    HalfOpen = 2,
}

impl From<u8> for CircuitState {
    fn from(value: u8) -> Self {
        match value {
            1 => CircuitState::Open,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Closed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens
    pub failure_threshold: u32,
    /// Successes in half-open state before the circuit closes
    pub success_threshold: u32,
    /// Time the circuit stays open before probing (ms)
    pub reset_timeout_ms: i64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            reset_timeout_ms: 30_000,
        }
    }
}

/// Lock-free circuit breaker.
///
/// While open, content reads fail fast with an unavailable error instead of
/// waiting on pool acquisition timeouts.
pub struct CircuitBreaker {
    state: AtomicU8,
    failures: AtomicU32,
    successes: AtomicU32,
    changed_at: AtomicI64,
    config: CircuitBreakerConfig,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            state: AtomicU8::new(CircuitState::Closed as u8),
            failures: AtomicU32::new(0),
            successes: AtomicU32::new(0),
            changed_at: AtomicI64::new(now_ms()),
            config,
        }
    }

    pub fn state(&self) -> CircuitState {
        self.state_at(now_ms())
    }

    fn state_at(&self, now: i64) -> CircuitState {
        let current = CircuitState::from(self.state.load(Ordering::Acquire));
        if current == CircuitState::Open
            && now - self.changed_at.load(Ordering::Acquire) >= self.config.reset_timeout_ms
            && self
                .state
                .compare_exchange(
                    CircuitState::Open as u8,
                    CircuitState::HalfOpen as u8,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_ok()
        {
            self.successes.store(0, Ordering::Release);
            self.changed_at.store(now, Ordering::Release);
            tracing::info!("Content database circuit half-open, probing");
            return CircuitState::HalfOpen;
        }
        CircuitState::from(self.state.load(Ordering::Acquire))
    }

    pub fn allow_request(&self) -> bool {
        self.state() != CircuitState::Open
    }

    pub fn record_success(&self) {
        match CircuitState::from(self.state.load(Ordering::Acquire)) {
            CircuitState::Closed => self.failures.store(0, Ordering::Release),
            CircuitState::HalfOpen => {
                let successes = self.successes.fetch_add(1, Ordering::AcqRel) + 1;
                if successes >= self.config.success_threshold {
                    self.transition(CircuitState::Closed);
                    tracing::info!("Content database circuit closed");
                }
            }
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&self) {
        match CircuitState::from(self.state.load(Ordering::Acquire)) {
            CircuitState::Closed => {
                let failures = self.failures.fetch_add(1, Ordering::AcqRel) + 1;
                if failures >= self.config.failure_threshold {
                    self.transition(CircuitState::Open);
                    tracing::warn!(failures, "Content database circuit opened");
                }
            }
            CircuitState::HalfOpen => {
                self.transition(CircuitState::Open);
                tracing::warn!("Content database circuit reopened after failed probe");
            }
            CircuitState::Open => self.changed_at.store(now_ms(), Ordering::Release),
        }
    }

    fn transition(&self, state: CircuitState) {
        self.state.store(state as u8, Ordering::Release);
        self.changed_at.store(now_ms(), Ordering::Release);
        self.successes.store(0, Ordering::Release);
        if state == CircuitState::Closed {
            self.failures.store(0, Ordering::Release);
        }
    }

    pub fn stats(&self) -> CircuitBreakerStats {
        CircuitBreakerStats {
            state: self.state(),
            failures: self.failures.load(Ordering::Acquire),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CircuitBreakerStats {
    pub state: CircuitState,
    pub failures: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(reset_timeout_ms: i64) -> CircuitBreaker {
        CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 2,
            success_threshold: 1,
            reset_timeout_ms,
        })
    }

    #[test]
    fn test_opens_after_threshold() {
        let cb = breaker(60_000);
        cb.record_failure();
        assert!(cb.allow_request());
        cb.record_failure();
        assert!(!cb.allow_request());
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[test]
    fn test_success_resets_failures() {
        let cb = breaker(60_000);
        cb.record_failure();
        cb.record_success();
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_recovery() {
        let cb = breaker(0);
        cb.record_failure();
        cb.record_failure();

        // Zero timeout: next observation moves to half-open
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
    }
}
