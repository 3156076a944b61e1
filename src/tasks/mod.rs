mod ratelimit_sweep;

pub use ratelimit_sweep::RateLimitSweepTask;
