//! Backend trait for content document storage.
//!
//! Documents are stored as JSON, keyed by collection and ID. Backends know
//! nothing about the typed documents; `ContentRepository` handles that.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{Collection, DocumentStatus};

/// Errors that can occur during backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// PostgreSQL operation failed
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend is temporarily unavailable (e.g., circuit breaker open)
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// A stored document with its bookkeeping columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub collection: Collection,
    pub id: String,
    pub status: DocumentStatus,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Storage abstraction for content documents.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Fetch a document; `Ok(None)` when it does not exist.
    async fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<StoredDocument>, BackendError>;

    /// All documents of a collection, oldest first.
    async fn list(&self, collection: Collection) -> Result<Vec<StoredDocument>, BackendError>;

    /// Insert a new document. Returns `false` if the ID is already taken.
    async fn insert(&self, document: StoredDocument) -> Result<bool, BackendError>;

    /// Replace an existing document. Returns `false` if it does not exist.
    async fn replace(&self, document: StoredDocument) -> Result<bool, BackendError>;

    /// Delete a document. Returns `false` if it did not exist.
    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, BackendError>;
}
