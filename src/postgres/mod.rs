//! PostgreSQL persistence for content documents.

pub mod circuit_breaker;
pub mod pool;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerStats, CircuitState};
pub use pool::{PostgresPool, PostgresPoolError, CONTENT_SCHEMA};
