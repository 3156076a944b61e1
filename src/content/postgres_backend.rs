//! PostgreSQL-based content backend.
//!
//! Documents live in the `content_documents` table as JSONB, keyed by
//! `(collection, id)`. See `migrations/001_content_documents.sql`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::metrics::ContentMetrics;
use crate::postgres::PostgresPool;

use super::backend::{BackendError, DocumentBackend, StoredDocument};
use super::types::{Collection, DocumentStatus};

type DocumentRow = (
    String,
    String,
    serde_json::Value,
    DateTime<Utc>,
    DateTime<Utc>,
);

pub struct PostgresDocumentBackend {
    pool: PostgresPool,
}

impl PostgresDocumentBackend {
    pub fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }

    fn guard(&self) -> Result<(), BackendError> {
        if self.pool.circuit_breaker().allow_request() {
            Ok(())
        } else {
            Err(BackendError::Unavailable(
                "content database circuit is open".to_string(),
            ))
        }
    }

    /// Feed the circuit breaker with the outcome of a query.
    fn track<T>(&self, operation: &'static str, result: Result<T, sqlx::Error>) -> Result<T, BackendError> {
        match result {
            Ok(value) => {
                self.pool.circuit_breaker().record_success();
                Ok(value)
            }
            Err(e) => {
                self.pool.circuit_breaker().record_failure();
                ContentMetrics::record_backend_error(operation);
                tracing::error!(operation, error = %e, "Content query failed");
                Err(BackendError::Postgres(e))
            }
        }
    }
}

fn into_document(collection: Collection, row: DocumentRow) -> StoredDocument {
    let (id, status, data, created_at, updated_at) = row;
    StoredDocument {
        collection,
        id,
        status: DocumentStatus::parse(&status),
        data,
        created_at,
        updated_at,
    }
}

#[async_trait]
impl DocumentBackend for PostgresDocumentBackend {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<StoredDocument>, BackendError> {
        self.guard()?;

        let result: Result<Option<DocumentRow>, sqlx::Error> = sqlx::query_as(
            r#"
            SELECT id, status, data, created_at, updated_at
            FROM content_documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(self.pool.pool())
        .await;

        Ok(self
            .track("get", result)?
            .map(|row| into_document(collection, row)))
    }

    async fn list(&self, collection: Collection) -> Result<Vec<StoredDocument>, BackendError> {
        self.guard()?;

        let result: Result<Vec<DocumentRow>, sqlx::Error> = sqlx::query_as(
            r#"
            SELECT id, status, data, created_at, updated_at
            FROM content_documents
            WHERE collection = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(collection.as_str())
        .fetch_all(self.pool.pool())
        .await;

        Ok(self
            .track("list", result)?
            .into_iter()
            .map(|row| into_document(collection, row))
            .collect())
    }

    async fn insert(&self, document: StoredDocument) -> Result<bool, BackendError> {
        self.guard()?;

        let result = sqlx::query(
            r#"
            INSERT INTO content_documents (collection, id, status, data, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (collection, id) DO NOTHING
            "#,
        )
        .bind(document.collection.as_str())
        .bind(&document.id)
        .bind(document.status.as_str())
        .bind(&document.data)
        .bind(document.created_at)
        .bind(document.updated_at)
        .execute(self.pool.pool())
        .await;

        Ok(self.track("insert", result)?.rows_affected() == 1)
    }

    async fn replace(&self, document: StoredDocument) -> Result<bool, BackendError> {
        self.guard()?;

        let result = sqlx::query(
            r#"
            UPDATE content_documents
            SET status = $3, data = $4, updated_at = $5
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(document.collection.as_str())
        .bind(&document.id)
        .bind(document.status.as_str())
        .bind(&document.data)
        .bind(document.updated_at)
        .execute(self.pool.pool())
        .await;

        Ok(self.track("replace", result)?.rows_affected() == 1)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, BackendError> {
        self.guard()?;

        let result = sqlx::query("DELETE FROM content_documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(self.pool.pool())
            .await;

        Ok(self.track("delete", result)?.rows_affected() == 1)
    }
}
