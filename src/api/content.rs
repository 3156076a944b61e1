//! Content endpoints: published/draft fetch and management CRUD.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::{Document, Message, Template};
use crate::error::{AppError, Result};
use crate::server::AppState;

/// `?draft=` query flag; `true` or `1` include drafts.
#[derive(Debug, Default, Deserialize)]
pub struct DraftQuery {
    pub draft: Option<String>,
}

impl DraftQuery {
    pub fn include_drafts(&self) -> bool {
        matches!(
            self.draft.as_deref().map(str::trim),
            Some("true") | Some("1")
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub docs: Vec<T>,
    pub total: usize,
}

/// Reject empty or whitespace-only path IDs.
pub(crate) fn require_id(id: &str) -> Result<&str> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("ID cannot be empty".to_string()));
    }
    Ok(trimmed)
}

pub(crate) fn json_body(body: std::result::Result<Json<Value>, JsonRejection>) -> Result<Value> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// GET /api/v1/messages/{id}
#[tracing::instrument(name = "http.get_message", skip(state, query), fields(draft = query.include_drafts()))]
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DraftQuery>,
) -> Result<Json<Message>> {
    let id = require_id(&id)?;
    let message = state
        .repository
        .get::<Message>(id, query.include_drafts())
        .await?;
    Ok(Json(message))
}

/// GET /api/v1/templates/{id}
#[tracing::instrument(name = "http.get_template", skip(state, query), fields(draft = query.include_drafts()))]
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DraftQuery>,
) -> Result<Json<Template>> {
    let id = require_id(&id)?;
    let template = state
        .repository
        .get::<Template>(id, query.include_drafts())
        .await?;
    Ok(Json(template))
}

/// GET /api/v1/{collection}
#[tracing::instrument(name = "http.list_documents", skip(state), fields(collection = T::COLLECTION.as_str()))]
pub async fn list_documents<T: Document>(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<T>>> {
    let docs = state.repository.list::<T>().await?;
    let total = docs.len();
    Ok(Json(ListResponse { docs, total }))
}

/// GET /api/v1/{collection}/{id} for management reads; drafts included
#[tracing::instrument(name = "http.get_document", skip(state), fields(collection = T::COLLECTION.as_str()))]
pub async fn get_document<T: Document>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<T>> {
    let id = require_id(&id)?;
    Ok(Json(state.repository.get::<T>(id, true).await?))
}

/// POST /api/v1/{collection}
#[tracing::instrument(name = "http.create_document", skip(state, body), fields(collection = T::COLLECTION.as_str()))]
pub async fn create_document<T: Document>(
    State(state): State<AppState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<T>)> {
    let document: T = serde_json::from_value(json_body(body)?)
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let created = state.repository.create(document).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/{collection}/{id}
#[tracing::instrument(name = "http.update_document", skip(state, body), fields(collection = T::COLLECTION.as_str()))]
pub async fn update_document<T: Document>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<T>> {
    let id = require_id(&id)?;
    let updated = state.repository.update::<T>(id, json_body(body)?).await?;
    Ok(Json(updated))
}

/// DELETE /api/v1/{collection}/{id}
#[tracing::instrument(name = "http.delete_document", skip(state), fields(collection = T::COLLECTION.as_str()))]
pub async fn delete_document<T: Document>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = require_id(&id)?;
    state.repository.delete::<T>(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
