//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::postgres::CircuitState;
use crate::preview::PreviewStatsSnapshot;
use crate::ratelimit::RateLimiterStats;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub content: ContentHealthResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postgres: Option<PostgresHealthResponse>,
    pub ratelimit: RateLimiterStats,
    pub previews: PreviewStatsSnapshot,
    pub broadcasts_recorded: usize,
}

#[derive(Debug, Serialize)]
pub struct ContentHealthResponse {
    pub backend: String,
}

#[derive(Debug, Serialize)]
pub struct PostgresHealthResponse {
    pub status: String,
    pub circuit: CircuitState,
    pub pool_size: u32,
    pub idle_connections: u32,
}

/// GET /health
#[tracing::instrument(name = "http.health", skip(state))]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let postgres = state.postgres.as_ref().map(|pool| {
        let circuit = pool.circuit_breaker().state();
        PostgresHealthResponse {
            status: if circuit == CircuitState::Open {
                "degraded".to_string()
            } else {
                "healthy".to_string()
            },
            circuit,
            pool_size: pool.pool().size(),
            idle_connections: pool.pool().num_idle() as u32,
        }
    });

    let degraded = postgres
        .as_ref()
        .map(|pg| pg.status != "healthy")
        .unwrap_or(false);

    Json(HealthResponse {
        status: if degraded { "degraded" } else { "healthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        content: ContentHealthResponse {
            backend: state.repository.backend_name().to_string(),
        },
        postgres,
        ratelimit: state.rate_limiter.stats(),
        previews: state.preview.stats(),
        broadcasts_recorded: state.broadcasts.history_len(),
    })
}
