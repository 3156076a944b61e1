use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::metrics::RateLimitMetrics;
use crate::ratelimit::RateLimiter;

/// Background task that evicts expired rate-limit windows
pub struct RateLimitSweepTask {
    rate_limiter: Arc<RateLimiter>,
    interval: Duration,
    shutdown: broadcast::Receiver<()>,
}

impl RateLimitSweepTask {
    pub fn new(rate_limiter: Arc<RateLimiter>, shutdown: broadcast::Receiver<()>) -> Self {
        let interval =
            Duration::from_secs(rate_limiter.config().cleanup_interval_seconds.max(1));
        Self {
            rate_limiter,
            interval,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        let mut timer = tokio::time::interval(self.interval);
        // Skip immediate first tick
        timer.tick().await;

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Rate limit sweep task started"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!("Rate limit sweep task received shutdown signal");
                    break;
                }
                _ = timer.tick() => {
                    self.sweep();
                }
            }
        }

        tracing::info!("Rate limit sweep task stopped");
    }

    fn sweep(&self) -> usize {
        let evicted = self.rate_limiter.cleanup_expired();
        let tracked = self.rate_limiter.stats().tracked_clients;
        RateLimitMetrics::record_sweep(evicted, tracked);
        evicted
    }
}
