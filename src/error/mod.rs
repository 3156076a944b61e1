use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::broadcast::BroadcastError;
use crate::content::ContentError;
use crate::render::RenderError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The content store or another dependency failed
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::NotFound { .. } => AppError::NotFound(err.to_string()),
            ContentError::AlreadyExists { .. } => AppError::Conflict(err.to_string()),
            ContentError::InvalidId(_) | ContentError::Invalid(_) => {
                AppError::Validation(err.to_string())
            }
            ContentError::Backend(_) => AppError::Upstream(err.to_string()),
            ContentError::Serialization(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<BroadcastError> for AppError {
    fn from(err: BroadcastError) -> Self {
        match err {
            BroadcastError::NotFound(_) => AppError::NotFound(err.to_string()),
            BroadcastError::Invalid(_) => AppError::Validation(err.to_string()),
            BroadcastError::Content(e) => e.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

/// Message shown to clients; details are only exposed outside production.
fn client_message(detail: &str, generic: &str) -> String {
    if is_production() {
        generic.to_string()
    } else {
        detail.to_string()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Auth(_) => "UNAUTHORIZED",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Upstream(_) => "UPSTREAM_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (client_msg, log_msg) = match &self {
            AppError::Config(e) => {
                let log_msg = e.to_string();
                (client_message(&log_msg, "Configuration error"), log_msg)
            }
            AppError::Upstream(msg) => (
                client_message(msg, "Content service temporarily unavailable"),
                msg.clone(),
            ),
            AppError::Internal(msg) => (client_message(msg, "Internal server error"), msg.clone()),
            AppError::Auth(msg)
            | AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => (msg.clone(), msg.clone()),
        };

        // Always log the detailed error server-side
        if status.is_server_error() {
            tracing::error!(code = %code, status = %status.as_u16(), message = %log_msg, "API error");
        } else {
            tracing::warn!(code = %code, status = %status.as_u16(), message = %log_msg, "API error");
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: client_msg,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{BackendError, Collection};

    #[test]
    fn test_content_error_mapping() {
        let not_found: AppError = ContentError::NotFound {
            collection: Collection::Messages,
            id: "m1".to_string(),
        }
        .into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let backend: AppError =
            ContentError::Backend(BackendError::Unavailable("circuit open".to_string())).into();
        assert_eq!(backend.status(), StatusCode::BAD_GATEWAY);

        let invalid: AppError = ContentError::InvalidId("bad".to_string()).into();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let conflict: AppError = ContentError::AlreadyExists {
            collection: Collection::Templates,
            id: "t1".to_string(),
        }
        .into();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_render_error_is_validation() {
        let err: AppError = RenderError::InvalidVariables("array".to_string()).into();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::NotFound("Template not found: x".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
