//! Preview endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::metrics::PreviewMetrics;
use crate::render::{Preview, Variables};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub template_id: Option<String>,
    /// Render a stored message instead of a template
    pub message_id: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub variables: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    pub preview: Preview,
}

enum PreviewTarget {
    Template(String),
    Message(String),
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl PreviewRequest {
    fn target(&self) -> Result<PreviewTarget> {
        match (
            non_blank(self.template_id.clone()),
            non_blank(self.message_id.clone()),
        ) {
            (Some(template_id), None) => Ok(PreviewTarget::Template(template_id)),
            (None, Some(message_id)) => Ok(PreviewTarget::Message(message_id)),
            (Some(_), Some(_)) => Err(AppError::Validation(
                "Provide either templateId or messageId, not both".to_string(),
            )),
            (None, None) => Err(AppError::Validation("templateId is required".to_string())),
        }
    }
}

/// Parse caller variables and enforce the configured size cap.
pub(crate) fn parse_variables(value: &Value, max: usize) -> Result<Variables> {
    let variables = Variables::from_json(value)?;
    if variables.len() > max {
        return Err(AppError::Validation(format!(
            "Too many variables: {} (max {})",
            variables.len(),
            max
        )));
    }
    Ok(variables)
}

/// POST /api/v1/preview
#[tracing::instrument(name = "http.preview", skip(state, body))]
pub async fn preview(
    State(state): State<AppState>,
    body: std::result::Result<Json<PreviewRequest>, JsonRejection>,
) -> Result<Json<PreviewResponse>> {
    let Json(request) = body.map_err(|rejection| {
        PreviewMetrics::record_failure("bad_request");
        AppError::Validation(rejection.body_text())
    })?;

    let target = request.target().inspect_err(|_| {
        PreviewMetrics::record_failure("bad_request");
    })?;
    let variables = parse_variables(&request.variables, state.settings.preview.max_variables)
        .inspect_err(|_| PreviewMetrics::record_failure("bad_request"))?;

    let result = match &target {
        PreviewTarget::Template(id) => {
            state
                .preview
                .preview_template(id, request.draft, &variables)
                .await
        }
        PreviewTarget::Message(id) => {
            state
                .preview
                .preview_message(id, request.draft, &variables)
                .await
        }
    };

    let preview = result.map_err(|e| {
        let err = AppError::from(e);
        PreviewMetrics::record_failure(err.code());
        err
    })?;

    let (template_id, message_id) = match target {
        PreviewTarget::Template(id) => (Some(id), None),
        PreviewTarget::Message(id) => (None, Some(id)),
    };

    Ok(Json(PreviewResponse {
        template_id,
        message_id,
        preview,
    }))
}
