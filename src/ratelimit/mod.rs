//! Rate limiting for the preview endpoint.
//!
//! A fixed-window counter per client IP, owned by the application state and
//! swept periodically so that idle clients do not accumulate.

mod config;
mod limiter;

pub use config::RateLimitConfig;
pub use limiter::{RateLimitResult, RateLimiter, RateLimiterStats};
