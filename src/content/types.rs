//! Content document types and error definitions

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::render::{Branding, CardButton};

use super::backend::BackendError;

/// Content-specific error type
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{collection} not found: {id}")]
    NotFound { collection: Collection, id: String },

    #[error("{collection} already exists: {id}")]
    AlreadyExists { collection: Collection, id: String },

    #[error("Invalid ID: {0}")]
    InvalidId(String),

    #[error("Invalid document: {0}")]
    Invalid(String),

    #[error("Content backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for content operations
pub type ContentResult<T> = Result<T, ContentError>;

/// Named collections of stored documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Templates,
    Messages,
    Brandings,
    Variables,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Templates => "templates",
            Collection::Messages => "messages",
            Collection::Brandings => "brandings",
            Collection::Variables => "variables",
        }
    }

    fn singular(&self) -> &'static str {
        match self {
            Collection::Templates => "Template",
            Collection::Messages => "Message",
            Collection::Brandings => "Branding",
            Collection::Variables => "Variable",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.singular())
    }
}

/// Publication status of a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Draft,
    Published,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Published => "published",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "published" => DocumentStatus::Published,
            _ => DocumentStatus::Draft,
        }
    }
}

/// A typed document stored in one collection.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    fn status(&self) -> DocumentStatus {
        DocumentStatus::Published
    }

    fn set_timestamps(&mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>);

    /// Document-specific checks beyond the ID rules
    fn validate_fields(&self) -> ContentResult<()> {
        Ok(())
    }

    fn validate(&self) -> ContentResult<()> {
        validate_id(self.id())?;
        self.validate_fields()
    }
}

/// IDs are 1-64 characters of alphanumeric, dash or underscore.
pub fn validate_id(id: &str) -> ContentResult<()> {
    if id.is_empty() || id.len() > 64 {
        return Err(ContentError::InvalidId(
            "ID must be 1-64 characters".to_string(),
        ));
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ContentError::InvalidId(
            "ID must contain only alphanumeric, dash, or underscore".to_string(),
        ));
    }

    Ok(())
}

fn require_len(field: &str, value: &str, max: usize) -> ContentResult<()> {
    if value.trim().is_empty() || value.len() > max {
        return Err(ContentError::Invalid(format!(
            "{} must be 1-{} characters",
            field, max
        )));
    }
    Ok(())
}

/// Reusable message layout with a rich body and placeholders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(default)]
    pub id: String,

    pub name: String,

    /// Title with {{variable}} placeholders
    #[serde(default)]
    pub title: String,

    /// Rich document tree (or a plain string)
    #[serde(default)]
    pub body: serde_json::Value,

    #[serde(default)]
    pub buttons: Vec<CardButton>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branding_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub status: DocumentStatus,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Document for Template {
    const COLLECTION: Collection = Collection::Templates;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn status(&self) -> DocumentStatus {
        self.status
    }

    fn set_timestamps(&mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) {
        self.created_at = created_at;
        self.updated_at = updated_at;
    }

    fn validate_fields(&self) -> ContentResult<()> {
        require_len("Name", &self.name, 256)?;
        if self.title.len() > 512 {
            return Err(ContentError::Invalid(
                "Title must be at most 512 characters".to_string(),
            ));
        }
        Ok(())
    }
}

/// A concrete message, optionally derived from a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub title: String,

    /// Rich body; falls back to the template body when null
    #[serde(default)]
    pub body: serde_json::Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branding_id: Option<String>,

    /// Stored variable values, overridden by caller-supplied ones
    #[serde(default)]
    pub variables: serde_json::Map<String, serde_json::Value>,

    #[serde(default)]
    pub buttons: Vec<CardButton>,

    #[serde(default)]
    pub status: DocumentStatus,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Document for Message {
    const COLLECTION: Collection = Collection::Messages;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn status(&self) -> DocumentStatus {
        self.status
    }

    fn set_timestamps(&mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) {
        self.created_at = created_at;
        self.updated_at = updated_at;
    }

    fn validate_fields(&self) -> ContentResult<()> {
        match &self.template_id {
            // Blank titles inherit the template title
            Some(template_id) => {
                validate_id(template_id)?;
                if self.title.len() > 512 {
                    return Err(ContentError::Invalid(
                        "Title must be at most 512 characters".to_string(),
                    ));
                }
            }
            None => require_len("Title", &self.title, 512)?,
        }
        Ok(())
    }
}

/// Named bundle of visual style tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandingPackage {
    #[serde(default)]
    pub id: String,

    pub name: String,

    /// The default package applies when a message names none
    #[serde(default)]
    pub is_default: bool,

    #[serde(flatten)]
    pub tokens: Branding,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Document for BrandingPackage {
    const COLLECTION: Collection = Collection::Brandings;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn set_timestamps(&mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) {
        self.created_at = created_at;
        self.updated_at = updated_at;
    }

    fn validate_fields(&self) -> ContentResult<()> {
        require_len("Name", &self.name, 256)
    }
}

/// Value type of a variable, used for display hints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    #[default]
    Text,
    Url,
    Email,
    Date,
    Boolean,
    Number,
}

/// Declared variable with an optional default value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDefinition {
    #[serde(default)]
    pub id: String,

    /// Placeholder identifier
    pub key: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub kind: VariableKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Document for VariableDefinition {
    const COLLECTION: Collection = Collection::Variables;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn set_timestamps(&mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) {
        self.created_at = created_at;
        self.updated_at = updated_at;
    }

    fn validate_fields(&self) -> ContentResult<()> {
        let mut chars = self.key.chars();
        let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ContentError::Invalid(format!(
                "Variable key '{}' must start with a letter and contain only alphanumeric, dash, or underscore",
                self.key
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_id() {
        assert!(validate_id("welcome-01").is_ok());
        assert!(matches!(validate_id(""), Err(ContentError::InvalidId(_))));
        assert!(matches!(validate_id("has space"), Err(ContentError::InvalidId(_))));
        assert!(matches!(validate_id(&"x".repeat(65)), Err(ContentError::InvalidId(_))));
    }

    #[test]
    fn test_template_deserialize_defaults() {
        let template: Template = serde_json::from_value(json!({
            "id": "welcome",
            "name": "Welcome",
            "title": "Hi {{name}}"
        }))
        .unwrap();

        assert_eq!(template.status, DocumentStatus::Draft);
        assert!(template.buttons.is_empty());
        assert!(template.body.is_null());
        assert!(template.validate().is_ok());
    }

    #[test]
    fn test_branding_package_flattens_tokens() {
        let package: BrandingPackage = serde_json::from_value(json!({
            "id": "corp",
            "name": "Corporate",
            "isDefault": true,
            "primaryColor": "#112233"
        }))
        .unwrap();

        assert!(package.is_default);
        assert_eq!(package.tokens.primary(), "#112233");

        let value = serde_json::to_value(&package).unwrap();
        assert_eq!(value["primaryColor"], "#112233");
    }

    #[test]
    fn test_variable_key_rules() {
        let mut variable: VariableDefinition =
            serde_json::from_value(json!({"id": "v1", "key": "firstName"})).unwrap();
        assert!(variable.validate().is_ok());

        variable.key = "1st".to_string();
        assert!(matches!(variable.validate(), Err(ContentError::Invalid(_))));
    }

    #[test]
    fn test_not_found_message() {
        let err = ContentError::NotFound {
            collection: Collection::Templates,
            id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Template not found: abc");
    }
}
