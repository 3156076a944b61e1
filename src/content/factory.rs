//! Content backend factory

use std::sync::Arc;

use crate::config::ContentConfig;
use crate::postgres::PostgresPool;

use super::backend::DocumentBackend;
use super::memory_backend::MemoryDocumentBackend;
use super::postgres_backend::PostgresDocumentBackend;

/// Create a document backend based on configuration.
///
/// - `"postgres"`: a `PostgresDocumentBackend` if a pool is provided
/// - `"memory"` (default): a `MemoryDocumentBackend`
///
/// A postgres request without a pool falls back to memory with a warning.
pub fn create_document_backend(
    settings: &ContentConfig,
    postgres_pool: Option<PostgresPool>,
) -> Arc<dyn DocumentBackend> {
    match settings.backend.as_str() {
        "postgres" => match postgres_pool {
            Some(pool) => {
                tracing::info!(
                    backend = "postgres",
                    url = %pool.database_url_masked(),
                    "Creating PostgreSQL content backend"
                );
                Arc::new(PostgresDocumentBackend::new(pool))
            }
            None => {
                tracing::warn!(
                    "PostgreSQL content backend requested but no pool provided, falling back to memory"
                );
                Arc::new(MemoryDocumentBackend::new())
            }
        },
        other => {
            if other != "memory" {
                tracing::warn!(backend = %other, "Unknown content backend, using memory");
            }
            tracing::info!(backend = "memory", "Creating memory content backend");
            Arc::new(MemoryDocumentBackend::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_without_pool_falls_back() {
        let settings = ContentConfig {
            backend: "postgres".to_string(),
            ..Default::default()
        };
        assert_eq!(create_document_backend(&settings, None).name(), "memory");
    }

    #[test]
    fn test_default_is_memory() {
        assert_eq!(
            create_document_backend(&ContentConfig::default(), None).name(),
            "memory"
        );
    }
}
