//! Seed file loading.
//!
//! A seed file is a JSON object with optional `templates`, `messages`,
//! `brandings` and `variables` arrays. Every seed document must carry an ID;
//! documents whose ID already exists are left untouched, so seeding is safe
//! to repeat on every start.

use std::path::Path;

use serde::Deserialize;

use super::repository::ContentRepository;
use super::types::{
    BrandingPackage, ContentError, ContentResult, Document, Message, Template, VariableDefinition,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub templates: Vec<Template>,
    pub messages: Vec<Message>,
    pub brandings: Vec<BrandingPackage>,
    pub variables: Vec<VariableDefinition>,
}

/// Outcome of a seeding run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
}

impl SeedData {
    pub fn from_json_str(raw: &str) -> ContentResult<Self> {
        let seed: Self = serde_json::from_str(raw)?;
        require_ids(&seed.brandings)?;
        require_ids(&seed.variables)?;
        require_ids(&seed.templates)?;
        require_ids(&seed.messages)?;
        Ok(seed)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ContentResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ContentError::Invalid(format!("Cannot read seed file {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&raw)
    }

    /// Insert every document. Brandings and variables go first so that
    /// templates and messages can reference them.
    pub async fn apply(self, repository: &ContentRepository) -> ContentResult<SeedReport> {
        let mut report = SeedReport::default();
        insert_all(repository, self.brandings, &mut report).await?;
        insert_all(repository, self.variables, &mut report).await?;
        insert_all(repository, self.templates, &mut report).await?;
        insert_all(repository, self.messages, &mut report).await?;

        tracing::info!(
            inserted = report.inserted,
            skipped = report.skipped,
            "Content seed applied"
        );
        Ok(report)
    }
}

// A generated ID would insert a fresh copy on every run
fn require_ids<T: Document>(documents: &[T]) -> ContentResult<()> {
    match documents.iter().position(|document| document.id().trim().is_empty()) {
        Some(index) => Err(ContentError::Invalid(format!(
            "Seed {} #{} has no ID",
            T::COLLECTION.as_str(),
            index
        ))),
        None => Ok(()),
    }
}

async fn insert_all<T: Document>(
    repository: &ContentRepository,
    documents: Vec<T>,
    report: &mut SeedReport,
) -> ContentResult<()> {
    for document in documents {
        match repository.create(document).await {
            Ok(_) => report.inserted += 1,
            Err(ContentError::AlreadyExists { id, .. }) => {
                tracing::debug!(collection = T::COLLECTION.as_str(), id = %id, "Seed document exists");
                report.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
