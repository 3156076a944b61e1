//! Content storage: templates, messages, branding packages and variable
//! definitions.
//!
//! Documents are stored as JSON behind the [`DocumentBackend`] trait and
//! accessed through the typed [`ContentRepository`].

mod backend;
mod branding_cache;
mod factory;
mod memory_backend;
mod postgres_backend;
mod repository;
mod seed;
mod types;

pub use backend::{BackendError, DocumentBackend, StoredDocument};
pub use branding_cache::BrandingCache;
pub use factory::create_document_backend;
pub use memory_backend::MemoryDocumentBackend;
pub use postgres_backend::PostgresDocumentBackend;
pub use repository::ContentRepository;
pub use seed::{SeedData, SeedReport};
pub use types::{
    validate_id, BrandingPackage, Collection, ContentError, ContentResult, Document,
    DocumentStatus, Message, Template, VariableDefinition, VariableKind,
};
