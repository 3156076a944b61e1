//! In-memory content backend.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::backend::{BackendError, DocumentBackend, StoredDocument};
use super::types::Collection;

/// Process-local document storage.
#[derive(Default)]
pub struct MemoryDocumentBackend {
    documents: DashMap<(Collection, String), StoredDocument>,
}

impl MemoryDocumentBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl DocumentBackend for MemoryDocumentBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<StoredDocument>, BackendError> {
        Ok(self
            .documents
            .get(&(collection, id.to_string()))
            .map(|entry| entry.value().clone()))
    }

    async fn list(&self, collection: Collection) -> Result<Vec<StoredDocument>, BackendError> {
        let mut documents: Vec<StoredDocument> = self
            .documents
            .iter()
            .filter(|entry| entry.key().0 == collection)
            .map(|entry| entry.value().clone())
            .collect();
        documents.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(documents)
    }

    async fn insert(&self, document: StoredDocument) -> Result<bool, BackendError> {
        match self
            .documents
            .entry((document.collection, document.id.clone()))
        {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(document);
                Ok(true)
            }
        }
    }

    async fn replace(&self, document: StoredDocument) -> Result<bool, BackendError> {
        match self
            .documents
            .get_mut(&(document.collection, document.id.clone()))
        {
            Some(mut existing) => {
                *existing = document;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, BackendError> {
        Ok(self.documents.remove(&(collection, id.to_string())).is_some())
    }
}
