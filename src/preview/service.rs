use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::content::{ContentError, ContentRepository, ContentResult, Message, Template};
use crate::metrics::PreviewMetrics;
use crate::render::{render_preview, CardButton, Content, Preview, PreviewInput, Variables};

/// Kind of document a preview was rendered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewSource {
    Template,
    Message,
}

impl PreviewSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewSource::Template => "template",
            PreviewSource::Message => "message",
        }
    }
}

/// Statistics for the preview service
#[derive(Debug, Default)]
pub struct PreviewStats {
    pub template_previews: AtomicU64,
    pub message_previews: AtomicU64,
}

impl PreviewStats {
    pub fn snapshot(&self) -> PreviewStatsSnapshot {
        PreviewStatsSnapshot {
            template_previews: self.template_previews.load(Ordering::Relaxed),
            message_previews: self.message_previews.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewStatsSnapshot {
    pub template_previews: u64,
    pub message_previews: u64,
}

/// Loads stored content and renders previews of it.
///
/// Variables are layered: declared defaults, then values stored on the
/// message, then the caller's values.
pub struct PreviewService {
    repository: Arc<ContentRepository>,
    stats: PreviewStats,
}

impl PreviewService {
    pub fn new(repository: Arc<ContentRepository>) -> Self {
        Self {
            repository,
            stats: PreviewStats::default(),
        }
    }

    pub fn repository(&self) -> &Arc<ContentRepository> {
        &self.repository
    }

    pub fn stats(&self) -> PreviewStatsSnapshot {
        self.stats.snapshot()
    }

    /// Render a stored template with caller-supplied variables.
    pub async fn preview_template(
        &self,
        id: &str,
        include_drafts: bool,
        variables: &Variables,
    ) -> ContentResult<Preview> {
        let template: Template = self.repository.get(id, include_drafts).await?;
        let defaults = self.repository.variable_defaults().await?;
        let branding = self
            .repository
            .resolve_branding(&[template.branding_id.as_deref()])
            .await?;

        let body = Content::from_json(&template.body);
        let variables = defaults.merged_with(variables);

        let preview = self.render(
            PreviewSource::Template,
            PreviewInput {
                title: &template.title,
                body: &body,
                buttons: &template.buttons,
                variables: &variables,
                branding: branding.as_ref(),
            },
        );
        self.stats.template_previews.fetch_add(1, Ordering::Relaxed);

        Ok(preview)
    }

    /// Render a stored message. Fields the message leaves empty (body,
    /// title, buttons) come from its template when it has one.
    pub async fn preview_message(
        &self,
        id: &str,
        include_drafts: bool,
        variables: &Variables,
    ) -> ContentResult<Preview> {
        let message: Message = self.repository.get(id, include_drafts).await?;
        let template = self.message_template(&message, include_drafts).await?;
        let defaults = self.repository.variable_defaults().await?;

        let branding_ids = [
            message.branding_id.as_deref(),
            template.as_ref().and_then(|t| t.branding_id.as_deref()),
        ];
        let branding = self.repository.resolve_branding(&branding_ids).await?;

        let body_json = match (&message.body, &template) {
            (serde_json::Value::Null, Some(template)) => &template.body,
            (body, _) => body,
        };
        let body = Content::from_json(body_json);

        let title = match &template {
            Some(template) if message.title.trim().is_empty() => template.title.as_str(),
            _ => message.title.as_str(),
        };

        let buttons: &[CardButton] = match &template {
            Some(template) if message.buttons.is_empty() => &template.buttons,
            _ => &message.buttons,
        };

        let variables = defaults
            .merged_with(&Variables::from_map(&message.variables))
            .merged_with(variables);

        let preview = self.render(
            PreviewSource::Message,
            PreviewInput {
                title,
                body: &body,
                buttons,
                variables: &variables,
                branding: branding.as_ref(),
            },
        );
        self.stats.message_previews.fetch_add(1, Ordering::Relaxed);

        Ok(preview)
    }

    /// The template a message derives from. Draft templates are only used
    /// with `include_drafts`; a dangling or hidden reference is logged and
    /// treated as no template.
    async fn message_template(
        &self,
        message: &Message,
        include_drafts: bool,
    ) -> ContentResult<Option<Template>> {
        let Some(template_id) = message.template_id.as_deref() else {
            return Ok(None);
        };

        match self
            .repository
            .get::<Template>(template_id, include_drafts)
            .await
        {
            Ok(template) => Ok(Some(template)),
            Err(ContentError::NotFound { .. }) => {
                tracing::warn!(
                    message_id = %message.id,
                    template_id = %template_id,
                    "Message references a missing or unpublished template"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn render(&self, source: PreviewSource, input: PreviewInput<'_>) -> Preview {
        let start = Instant::now();
        let preview = render_preview(input);
        PreviewMetrics::record_render(source.as_str(), start.elapsed());
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{BrandingPackage, Document, MemoryDocumentBackend, VariableDefinition};
    use serde::de::DeserializeOwned;
    use serde_json::{json, Value};
    use std::time::Duration;

    fn doc<T: DeserializeOwned>(value: Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    async fn service() -> PreviewService {
        let repository = Arc::new(ContentRepository::new(
            Arc::new(MemoryDocumentBackend::new()),
            Duration::from_secs(60),
        ));

        let template: Template = doc(json!({
            "id": "outage",
            "name": "Outage",
            "title": "Outage in {{region}}",
            "status": "published",
            "body": {"root": {"type": "root", "children": [
                {"type": "paragraph", "children": [
                    {"type": "text", "text": "Team: "},
                    {"type": "block", "fields": {"blockType": "variable", "variable": {"key": "team"}}}
                ]}
            ]}},
            "buttons": [{"kind": "approve", "label": "Got it"}]
        }));
        let message: Message = doc(json!({
            "id": "outage-eu",
            "title": "",
            "templateId": "outage",
            "variables": {"region": "EU"},
            "status": "draft"
        }));
        let default_team: VariableDefinition =
            doc(json!({"id": "team", "key": "team", "defaultValue": "Ops"}));
        let branding: BrandingPackage =
            doc(json!({"id": "corp", "name": "Corp", "isDefault": true, "primaryColor": "#123456"}));

        repository.create(template).await.unwrap();
        repository.create(message).await.unwrap();
        repository.create(default_team).await.unwrap();
        repository.create(branding).await.unwrap();

        PreviewService::new(repository)
    }

    #[tokio::test]
    async fn test_template_preview_uses_defaults_and_caller_values() {
        let service = service().await;

        let preview = service
            .preview_template("outage", false, &Variables::new())
            .await
            .unwrap();
        assert_eq!(preview.title, "Outage in {{region}}");
        assert_eq!(preview.text, "Team: Ops\n");

        let vars: Variables = [("region", "US"), ("team", "Net")].into_iter().collect();
        let preview = service.preview_template("outage", false, &vars).await.unwrap();
        assert_eq!(preview.title, "Outage in US");
        assert_eq!(preview.text, "Team: Net\n");
        assert_eq!(preview.device["theme"]["primaryColor"], "#123456");
    }

    #[tokio::test]
    async fn test_message_preview_inherits_from_template() {
        let service = service().await;

        assert!(matches!(
            service.preview_message("outage-eu", false, &Variables::new()).await,
            Err(ContentError::NotFound { .. })
        ));

        let preview = service
            .preview_message("outage-eu", true, &Variables::new())
            .await
            .unwrap();
        assert_eq!(preview.title, "Outage in EU");
        assert_eq!(preview.text, "Team: Ops\n");
        assert_eq!(preview.device["actions"][0]["label"], "Got it");
        assert_eq!(service.stats().message_previews, 1);
    }

    #[tokio::test]
    async fn test_missing_template_is_not_found() {
        let service = service().await;
        let err = service
            .preview_template("nope", true, &Variables::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Template not found: nope");
        assert_eq!(Template::COLLECTION.as_str(), "templates");
    }

    #[tokio::test]
    async fn test_published_message_ignores_draft_template() {
        let service = service().await;
        let draft_template: Template = doc(json!({
            "id": "planned",
            "name": "Planned",
            "title": "Unreleased wording",
            "body": "Unreleased body",
            "status": "draft"
        }));
        let message: Message = doc(json!({
            "id": "planned-note",
            "title": "Maintenance note",
            "templateId": "planned",
            "status": "published"
        }));
        service.repository().create(draft_template).await.unwrap();
        service.repository().create(message).await.unwrap();

        let preview = service
            .preview_message("planned-note", false, &Variables::new())
            .await
            .unwrap();
        assert_eq!(preview.title, "Maintenance note");
        assert_eq!(preview.text, "");

        let preview = service
            .preview_message("planned-note", true, &Variables::new())
            .await
            .unwrap();
        assert_eq!(preview.text, "Unreleased body");
    }
}

