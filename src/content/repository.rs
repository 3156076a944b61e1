//! Typed access to content documents

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::render::{Branding, Variables};

use super::backend::{DocumentBackend, StoredDocument};
use super::branding_cache::BrandingCache;
use super::types::{
    BrandingPackage, Collection, ContentError, ContentResult, Document, DocumentStatus,
    VariableDefinition,
};

/// Fields that callers cannot change through an update.
const IMMUTABLE_FIELDS: [&str; 3] = ["id", "createdAt", "updatedAt"];

/// Typed repository over a [`DocumentBackend`].
pub struct ContentRepository {
    backend: Arc<dyn DocumentBackend>,
    branding_cache: BrandingCache,
}

fn not_found<T: Document>(id: &str) -> ContentError {
    ContentError::NotFound {
        collection: T::COLLECTION,
        id: id.to_string(),
    }
}

fn to_stored<T: Document>(
    document: &T,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> ContentResult<StoredDocument> {
    Ok(StoredDocument {
        collection: T::COLLECTION,
        id: document.id().to_string(),
        status: document.status(),
        data: serde_json::to_value(document)?,
        created_at,
        updated_at,
    })
}

fn from_stored<T: Document>(stored: StoredDocument) -> ContentResult<T> {
    let mut document: T = serde_json::from_value(stored.data)?;
    // Bookkeeping columns win over whatever the JSON carries
    document.set_id(stored.id);
    document.set_timestamps(stored.created_at, stored.updated_at);
    Ok(document)
}

impl ContentRepository {
    pub fn new(backend: Arc<dyn DocumentBackend>, branding_cache_ttl: Duration) -> Self {
        Self {
            backend,
            branding_cache: BrandingCache::new(branding_cache_ttl),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Fetch a document. Drafts are only visible with `include_drafts`.
    pub async fn get<T: Document>(&self, id: &str, include_drafts: bool) -> ContentResult<T> {
        let stored = self
            .backend
            .get(T::COLLECTION, id)
            .await?
            .ok_or_else(|| not_found::<T>(id))?;

        if !include_drafts && stored.status != DocumentStatus::Published {
            return Err(not_found::<T>(id));
        }

        from_stored(stored)
    }

    /// All documents of a collection. Documents that no longer decode are
    /// skipped with a warning.
    pub async fn list<T: Document>(&self) -> ContentResult<Vec<T>> {
        let stored = self.backend.list(T::COLLECTION).await?;
        let mut documents = Vec::with_capacity(stored.len());

        for item in stored {
            let id = item.id.clone();
            match from_stored::<T>(item) {
                Ok(document) => documents.push(document),
                Err(e) => tracing::warn!(
                    collection = T::COLLECTION.as_str(),
                    id = %id,
                    error = %e,
                    "Skipping undecodable document"
                ),
            }
        }

        Ok(documents)
    }

    /// Create a document, generating an ID when none is given.
    pub async fn create<T: Document>(&self, mut document: T) -> ContentResult<T> {
        if document.id().is_empty() {
            document.set_id(Uuid::new_v4().to_string());
        }

        let now = Utc::now();
        document.set_timestamps(now, now);
        document.validate()?;

        if !self.backend.insert(to_stored(&document, now, now)?).await? {
            return Err(ContentError::AlreadyExists {
                collection: T::COLLECTION,
                id: document.id().to_string(),
            });
        }

        self.after_write(T::COLLECTION);
        tracing::info!(
            collection = T::COLLECTION.as_str(),
            id = %document.id(),
            "Document created"
        );

        Ok(document)
    }

    /// Apply a partial update: top-level fields of `patch` replace the
    /// stored ones.
    pub async fn update<T: Document>(&self, id: &str, patch: Value) -> ContentResult<T> {
        let Value::Object(patch) = patch else {
            return Err(ContentError::Invalid(
                "Update must be a JSON object".to_string(),
            ));
        };

        let existing = self
            .backend
            .get(T::COLLECTION, id)
            .await?
            .ok_or_else(|| not_found::<T>(id))?;

        let mut data = existing.data;
        if let Value::Object(map) = &mut data {
            for (key, value) in patch {
                if !IMMUTABLE_FIELDS.contains(&key.as_str()) {
                    map.insert(key, value);
                }
            }
        }

        let mut document: T =
            serde_json::from_value(data).map_err(|e| ContentError::Invalid(e.to_string()))?;
        let now = Utc::now();
        document.set_id(id.to_string());
        document.set_timestamps(existing.created_at, now);
        document.validate()?;

        if !self
            .backend
            .replace(to_stored(&document, existing.created_at, now)?)
            .await?
        {
            return Err(not_found::<T>(id));
        }

        self.after_write(T::COLLECTION);
        Ok(document)
    }

    pub async fn delete<T: Document>(&self, id: &str) -> ContentResult<()> {
        if !self.backend.delete(T::COLLECTION, id).await? {
            return Err(not_found::<T>(id));
        }
        self.after_write(T::COLLECTION);
        tracing::info!(collection = T::COLLECTION.as_str(), id = %id, "Document deleted");
        Ok(())
    }

    fn after_write(&self, collection: Collection) {
        if collection == Collection::Brandings {
            self.branding_cache.invalidate();
        }
    }

    /// The package flagged `isDefault`, served from the cache when fresh.
    pub async fn default_branding(&self) -> ContentResult<Option<Branding>> {
        if let Some(cached) = self.branding_cache.get() {
            return Ok(cached);
        }

        let generation = self.branding_cache.generation();
        let default = self
            .list::<BrandingPackage>()
            .await?
            .into_iter()
            .find(|package| package.is_default)
            .map(|package| package.tokens);

        self.branding_cache.put(default.clone(), generation);
        Ok(default)
    }

    /// First branding package found among `candidates`, else the default.
    ///
    /// Dangling references are logged and skipped.
    pub async fn resolve_branding(
        &self,
        candidates: &[Option<&str>],
    ) -> ContentResult<Option<Branding>> {
        for id in candidates.iter().flatten() {
            match self.get::<BrandingPackage>(id, true).await {
                Ok(package) => return Ok(Some(package.tokens)),
                Err(ContentError::NotFound { .. }) => {
                    tracing::warn!(branding_id = %id, "Referenced branding package not found");
                }
                Err(e) => return Err(e),
            }
        }

        self.default_branding().await
    }

    /// Default values of all declared variables.
    pub async fn variable_defaults(&self) -> ContentResult<Variables> {
        Ok(self
            .list::<VariableDefinition>()
            .await?
            .into_iter()
            .filter_map(|variable| variable.default_value.map(|value| (variable.key, value)))
            .collect())
    }
}
