use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::broadcast::{BroadcastService, BroadcastSink, LoggingBroadcastSink};
use crate::config::Settings;
use crate::content::{ContentRepository, DocumentBackend};
use crate::postgres::PostgresPool;
use crate::preview::PreviewService;
use crate::ratelimit::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub repository: Arc<ContentRepository>,
    pub preview: Arc<PreviewService>,
    pub broadcasts: Arc<BroadcastService>,
    pub rate_limiter: Arc<RateLimiter>,
    pub postgres: Option<PostgresPool>,
    pub started_at: Instant,
}

impl AppState {
    /// State with the logging broadcast sink.
    pub fn new(settings: Settings, backend: Arc<dyn DocumentBackend>) -> Self {
        Self::with_sink(settings, backend, Arc::new(LoggingBroadcastSink))
    }

    pub fn with_sink(
        settings: Settings,
        backend: Arc<dyn DocumentBackend>,
        sink: Arc<dyn BroadcastSink>,
    ) -> Self {
        let repository = Arc::new(ContentRepository::new(
            backend,
            Duration::from_secs(settings.content.branding_cache_ttl_seconds),
        ));
        let preview = Arc::new(PreviewService::new(repository.clone()));
        let broadcasts = Arc::new(BroadcastService::new(
            preview.clone(),
            sink,
            settings.broadcast.history_limit,
        ));
        let rate_limiter = Arc::new(RateLimiter::new(settings.ratelimit.clone()));

        Self {
            settings: Arc::new(settings),
            repository,
            preview,
            broadcasts,
            rate_limiter,
            postgres: None,
            started_at: Instant::now(),
        }
    }

    /// Attach the pool so health checks can report on it.
    pub fn with_postgres(mut self, pool: Option<PostgresPool>) -> Self {
        self.postgres = pool;
        self
    }
}
