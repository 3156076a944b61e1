use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, MatchedPath, State},
    http::{HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::AppState;
use crate::error::AppError;
use crate::metrics::{HttpMetrics, RateLimitMetrics};
use crate::ratelimit::RateLimitResult;

pub const API_KEY_HEADER: &str = "X-API-Key";
pub const PREVIEW_SECRET_HEADER: &str = "X-Preview-Secret";

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// API Key authentication middleware for management routes.
/// Validates X-API-Key header against configured api.key
pub async fn api_key_auth(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // If no API key is configured, allow all requests (development mode)
    let Some(expected_key) = &state.settings.api.key else {
        return Ok(next.run(req).await);
    };

    match header_value(req.headers(), API_KEY_HEADER) {
        Some(key) if key == expected_key => Ok(next.run(req).await),
        Some(_) => {
            tracing::warn!("Invalid API key provided");
            Err(AppError::Auth("Invalid API key".to_string()))
        }
        None => {
            tracing::warn!("Missing API key header");
            Err(AppError::Auth("Missing API key".to_string()))
        }
    }
}

/// Shared-secret check for the preview route.
/// Validates X-Preview-Secret against preview.shared_secret when one is set.
pub async fn preview_secret(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = &state.settings.preview.shared_secret else {
        return Ok(next.run(req).await);
    };

    match header_value(req.headers(), PREVIEW_SECRET_HEADER) {
        Some(secret) if secret == expected => Ok(next.run(req).await),
        _ => {
            tracing::warn!("Preview request with missing or wrong secret");
            Err(AppError::Auth("Invalid preview secret".to_string()))
        }
    }
}

/// Per-IP rate limiting for the preview route.
///
/// Returns 429 Too Many Requests with Retry-After when the window is spent.
pub async fn preview_rate_limit(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !state.rate_limiter.is_enabled() {
        return next.run(req).await;
    }

    match state.rate_limiter.check_ip(addr.ip()) {
        RateLimitResult::Allowed {
            remaining,
            limit,
            reset_at,
        } => {
            RateLimitMetrics::record_preview_allowed();
            let mut response = next.run(req).await;
            insert_rate_limit_headers(response.headers_mut(), limit, remaining, reset_at);
            response
        }
        RateLimitResult::Denied {
            retry_after,
            limit,
            reset_at,
        } => {
            RateLimitMetrics::record_preview_denied();
            tracing::warn!(
                ip = %addr.ip(),
                retry_after = retry_after,
                "Preview rate limit exceeded"
            );

            rate_limit_response(retry_after, limit, reset_at)
        }
    }
}

/// Request counter and latency by route template.
pub async fn track_http_metrics(req: Request<Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = Instant::now();

    let response = next.run(req).await;

    HttpMetrics::record_request(&method, &path, response.status().as_u16(), start.elapsed());
    response
}

fn insert_rate_limit_headers(headers: &mut HeaderMap, limit: u32, remaining: u32, reset_at: i64) {
    if let Ok(v) = HeaderValue::from_str(&limit.to_string()) {
        headers.insert("X-RateLimit-Limit", v);
    }
    if let Ok(v) = HeaderValue::from_str(&remaining.to_string()) {
        headers.insert("X-RateLimit-Remaining", v);
    }
    if let Ok(v) = HeaderValue::from_str(&reset_at.to_string()) {
        headers.insert("X-RateLimit-Reset", v);
    }
}

/// Build a rate limit error response with proper headers
fn rate_limit_response(retry_after: u64, limit: u32, reset_at: i64) -> Response {
    let body = json!({
        "error": {
            "code": "RATE_LIMITED",
            "message": format!("Too many requests, please retry after {} seconds", retry_after)
        }
    });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();

    let headers = response.headers_mut();
    if let Ok(v) = HeaderValue::from_str(&retry_after.to_string()) {
        headers.insert("Retry-After", v);
    }
    insert_rate_limit_headers(headers, limit, 0, reset_at);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_response_headers() {
        let response = rate_limit_response(12, 30, 1_700_000_000_000);

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let headers = response.headers();
        assert_eq!(headers["Retry-After"], "12");
        assert_eq!(headers["X-RateLimit-Limit"], "30");
        assert_eq!(headers["X-RateLimit-Remaining"], "0");
        assert_eq!(headers["X-RateLimit-Reset"], "1700000000000");
    }
}
