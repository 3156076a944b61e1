//! Broadcast trigger, polling and search endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::broadcast::{Broadcast, BroadcastQuery, BroadcastTarget};
use crate::error::{AppError, Result};
use crate::server::AppState;

use super::content::require_id;
use super::preview::parse_variables;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerBroadcastRequest {
    pub message_id: String,
    pub target: BroadcastTarget,
    #[serde(default)]
    pub variables: Value,
    #[serde(default)]
    pub draft: bool,
}

#[derive(Debug, Serialize)]
pub struct BroadcastListResponse {
    pub broadcasts: Vec<Broadcast>,
    pub total: usize,
}

/// POST /api/v1/broadcasts
#[tracing::instrument(name = "http.trigger_broadcast", skip(state, body))]
pub async fn trigger_broadcast(
    State(state): State<AppState>,
    body: std::result::Result<Json<TriggerBroadcastRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Broadcast>)> {
    let Json(request) = body.map_err(|rejection| AppError::Validation(rejection.body_text()))?;

    let message_id = require_id(&request.message_id)?;
    let variables = parse_variables(&request.variables, state.settings.preview.max_variables)?;

    let broadcast = state
        .broadcasts
        .trigger(message_id, request.target, &variables, request.draft)
        .await?;

    Ok((StatusCode::ACCEPTED, Json(broadcast)))
}

/// GET /api/v1/broadcasts/{id}
#[tracing::instrument(name = "http.get_broadcast", skip(state))]
pub async fn get_broadcast(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Broadcast>> {
    let id = Uuid::parse_str(require_id(&id)?)
        .map_err(|_| AppError::Validation(format!("Invalid broadcast ID: {}", id)))?;
    Ok(Json(state.broadcasts.get(id)?))
}

/// GET /api/v1/broadcasts?q=&status=&limit=
#[tracing::instrument(name = "http.search_broadcasts", skip(state, query))]
pub async fn search_broadcasts(
    State(state): State<AppState>,
    query: std::result::Result<Query<BroadcastQuery>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<BroadcastListResponse>> {
    let Query(query) = query.map_err(|rejection| AppError::Validation(rejection.body_text()))?;

    let broadcasts = state.broadcasts.search(&query);
    let total = broadcasts.len();
    Ok(Json(BroadcastListResponse { broadcasts, total }))
}
