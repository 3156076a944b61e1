//! HTTP-level tests driving the full router in-process.
//!
//! Requests go through `tower::ServiceExt::oneshot` with a `ConnectInfo`
//! extension standing in for the TCP peer address.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tower::ServiceExt;

use comms_preview_service::config::Settings;
use comms_preview_service::content::{
    BackendError, Collection, DocumentBackend, MemoryDocumentBackend, Message, StoredDocument,
    Template,
};
use comms_preview_service::server::{create_app, AppState};

const API_KEY: &str = "test-key";

fn doc<T: DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).unwrap()
}

async fn seeded_state(settings: Settings) -> AppState {
    let state = AppState::new(settings, Arc::new(MemoryDocumentBackend::new()));

    let welcome: Template = doc(json!({
        "id": "welcome",
        "name": "Welcome",
        "title": "Welcome {{name}}",
        "status": "published",
        "body": {"root": {"type": "root", "children": [
            {"type": "paragraph", "children": [
                {"type": "text", "text": "Hello ", "format": 0},
                {"type": "text", "text": "team", "format": 1},
                {"type": "block", "fields": {"blockType": "variable", "variable": {"key": "name"}}}
            ]},
            {"type": "block", "fields": {"blockType": "button", "kind": "approve", "label": "Acknowledge"}}
        ]}}
    }));
    let draft: Template = doc(json!({
        "id": "upcoming",
        "name": "Upcoming",
        "title": "Soon",
        "status": "draft"
    }));
    let message: Message = doc(json!({
        "id": "patch-notice",
        "title": "Patching {{site}}",
        "templateId": "welcome",
        "status": "published",
        "variables": {"site": "Berlin"}
    }));

    state.repository.create(welcome).await.unwrap();
    state.repository.create(draft).await.unwrap();
    state.repository.create(message).await.unwrap();
    state
}

async fn app() -> Router {
    create_app(seeded_state(Settings::default()).await)
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let mut req = match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    req.extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))));
    req
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, headers, body)
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, _, body) = send(&app, request("GET", "/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["content"]["backend"], "memory");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = app().await;
    let response = app
        .clone()
        .oneshot(request("GET", "/metrics", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_fetch_respects_draft_flag() {
    let app = app().await;

    let (status, _, body) = send(&app, request("GET", "/api/v1/templates/welcome", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Welcome {{name}}");

    let (status, _, body) = send(&app, request("GET", "/api/v1/templates/upcoming", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _, _) = send(
        &app,
        request("GET", "/api/v1/templates/upcoming?draft=true", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = send(&app, request("GET", "/api/v1/messages/patch-notice", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["templateId"], "welcome");
}

#[tokio::test]
async fn test_fetch_blank_id_is_bad_request() {
    let app = app().await;
    let (status, _, _) = send(&app, request("GET", "/api/v1/messages/%20%20", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_preview_template() {
    let app = app().await;
    let (status, _, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/preview",
            Some(json!({"templateId": "welcome", "variables": {"name": "Ana"}})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["templateId"], "welcome");

    let preview = &body["preview"];
    assert_eq!(preview["title"], "Welcome Ana");
    assert_eq!(preview["text"], "Hello teamAna\n");
    assert!(preview["html"]
        .as_str()
        .unwrap()
        .contains("<strong>team</strong>Ana"));
    assert_eq!(preview["device"]["type"], "device-card");
    assert_eq!(preview["device"]["actions"][0]["label"], "Acknowledge");
    assert_eq!(preview["teams"]["type"], "AdaptiveCard");
    assert_eq!(preview["teams"]["version"], "1.4");
}

#[tokio::test]
async fn test_preview_unresolved_variable_stays_literal() {
    let app = app().await;
    let (status, _, body) = send(
        &app,
        request("POST", "/api/v1/preview", Some(json!({"templateId": "welcome"}))),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["preview"]["title"], "Welcome {{name}}");
    assert_eq!(body["preview"]["text"], "Hello team{{name}}\n");
}

#[tokio::test]
async fn test_preview_message() {
    let app = app().await;
    let (status, _, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/preview",
            Some(json!({"messageId": "patch-notice", "variables": {"name": "Ops"}})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["messageId"], "patch-notice");
    assert_eq!(body["preview"]["title"], "Patching Berlin");
    assert_eq!(body["preview"]["text"], "Hello teamOps\n");
}

#[tokio::test]
async fn test_preview_rejects_bad_input() {
    let app = app().await;

    let cases = [
        json!({}),
        json!({"templateId": ""}),
        json!({"templateId": "welcome", "variables": ["a"]}),
        json!({"templateId": "welcome", "variables": "name=Ana"}),
        json!({"templateId": 42}),
        json!({"templateId": "welcome", "draft": "yes"}),
    ];

    for case in cases {
        let (status, _, body) =
            send(&app, request("POST", "/api/v1/preview", Some(case.clone()))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "case: {}", case);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR", "case: {}", case);
    }

    let mut raw = request("POST", "/api/v1/preview", None);
    *raw.body_mut() = Body::from("{not json");
    let (status, _, _) = send(&app, raw).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_preview_not_found_and_drafts() {
    let app = app().await;

    let (status, _, _) = send(
        &app,
        request("POST", "/api/v1/preview", Some(json!({"templateId": "missing"}))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(
        &app,
        request("POST", "/api/v1/preview", Some(json!({"templateId": "upcoming"}))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/preview",
            Some(json!({"templateId": "upcoming", "draft": true})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["preview"]["title"], "Soon");
}

#[tokio::test]
async fn test_preview_shared_secret() {
    let mut settings = Settings::default();
    settings.preview.shared_secret = Some("s3cret".to_string());
    let app = create_app(seeded_state(settings).await);
    let body = json!({"templateId": "welcome"});

    let (status, _, _) = send(&app, request("POST", "/api/v1/preview", Some(body.clone()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut req = request("POST", "/api/v1/preview", Some(body));
    req.headers_mut()
        .insert("X-Preview-Secret", "s3cret".parse().unwrap());
    let (status, _, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_preview_rate_limited() {
    let mut settings = Settings::default();
    settings.ratelimit.max_requests = 2;
    let app = create_app(seeded_state(settings).await);
    let body = json!({"templateId": "welcome"});

    for remaining in ["1", "0"] {
        let (status, headers, _) =
            send(&app, request("POST", "/api/v1/preview", Some(body.clone()))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["X-RateLimit-Remaining"], remaining);
    }

    let (status, headers, body) =
        send(&app, request("POST", "/api/v1/preview", Some(body))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "RATE_LIMITED");
    assert_eq!(headers["X-RateLimit-Limit"], "2");
    assert!(headers.contains_key("Retry-After"));
}

#[tokio::test]
async fn test_management_requires_api_key() {
    let mut settings = Settings::default();
    settings.api.key = Some(API_KEY.to_string());
    let app = create_app(seeded_state(settings).await);

    let (status, _, _) = send(&app, request("GET", "/api/v1/templates", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Public fetch stays open
    let (status, _, _) = send(&app, request("GET", "/api/v1/templates/welcome", None)).await;
    assert_eq!(status, StatusCode::OK);

    let mut req = request("GET", "/api/v1/templates", None);
    req.headers_mut().insert("X-API-Key", API_KEY.parse().unwrap());
    let (status, _, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn test_template_crud() {
    let app = app().await;

    let (status, _, created) = send(
        &app,
        request(
            "POST",
            "/api/v1/templates",
            Some(json!({"id": "reboot", "name": "Reboot", "title": "Reboot tonight"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "draft");

    let (status, _, _) = send(
        &app,
        request(
            "POST",
            "/api/v1/templates",
            Some(json!({"id": "reboot", "name": "Again"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _, updated) = send(
        &app,
        request(
            "PUT",
            "/api/v1/templates/reboot",
            Some(json!({"status": "published", "title": "Reboot at 22:00"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Reboot at 22:00");
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let (status, _, _) = send(&app, request("GET", "/api/v1/templates/reboot", None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(&app, request("DELETE", "/api/v1/templates/reboot", None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = send(&app, request("DELETE", "/api/v1/templates/reboot", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_validation() {
    let app = app().await;

    let (status, _, _) = send(
        &app,
        request(
            "POST",
            "/api/v1/templates",
            Some(json!({"id": "has space", "name": "Bad"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(
        &app,
        request("POST", "/api/v1/variables", Some(json!({"key": "9lives"}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, created) = send(
        &app,
        request(
            "POST",
            "/api/v1/brandings",
            Some(json!({"name": "Corp", "isDefault": true, "primaryColor": "#0A0A0A"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"].as_str().unwrap().len(), 36);
}

#[tokio::test]
async fn test_default_branding_applies_after_create() {
    let app = app().await;
    let preview_body = json!({"templateId": "welcome"});

    let (_, _, before) =
        send(&app, request("POST", "/api/v1/preview", Some(preview_body.clone()))).await;
    assert_eq!(before["preview"]["device"]["theme"]["primaryColor"], "#0F62FE");

    let (status, _, _) = send(
        &app,
        request(
            "POST",
            "/api/v1/brandings",
            Some(json!({"id": "corp", "name": "Corp", "isDefault": true, "primaryColor": "#AA0000"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, _, after) = send(&app, request("POST", "/api/v1/preview", Some(preview_body))).await;
    assert_eq!(after["preview"]["device"]["theme"]["primaryColor"], "#AA0000");
}

#[tokio::test]
async fn test_broadcast_lifecycle() {
    let app = app().await;

    let (status, _, created) = send(
        &app,
        request(
            "POST",
            "/api/v1/broadcasts",
            Some(json!({
                "messageId": "patch-notice",
                "target": {"kind": "group", "id": "berlin-office"},
                "variables": {"site": "Munich"}
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(created["status"], "sent");
    assert_eq!(created["title"], "Patching Munich");

    let id = created["id"].as_str().unwrap();
    let (status, _, fetched) =
        send(&app, request("GET", &format!("/api/v1/broadcasts/{}", id), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, _, found) = send(&app, request("GET", "/api/v1/broadcasts?q=munich", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["total"], 1);

    let (_, _, none) = send(
        &app,
        request("GET", "/api/v1/broadcasts?status=failed", None),
    )
    .await;
    assert_eq!(none["total"], 0);

    let (status, _, _) = send(&app, request("GET", "/api/v1/broadcasts/not-a-uuid", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(
        &app,
        request(
            "POST",
            "/api/v1/broadcasts",
            Some(json!({"messageId": "ghost", "target": {"kind": "device", "id": "d1"}})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(
        &app,
        request(
            "POST",
            "/api/v1/broadcasts",
            Some(json!({"messageId": "patch-notice", "target": {"kind": "satellite", "id": "x"}})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Backend whose every call fails as if the database were down.
struct UnavailableBackend;

#[async_trait]
impl DocumentBackend for UnavailableBackend {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    async fn get(
        &self,
        _collection: Collection,
        _id: &str,
    ) -> Result<Option<StoredDocument>, BackendError> {
        Err(BackendError::Unavailable("circuit open".to_string()))
    }

    async fn list(&self, _collection: Collection) -> Result<Vec<StoredDocument>, BackendError> {
        Err(BackendError::Unavailable("circuit open".to_string()))
    }

    async fn insert(&self, _document: StoredDocument) -> Result<bool, BackendError> {
        Err(BackendError::Unavailable("circuit open".to_string()))
    }

    async fn replace(&self, _document: StoredDocument) -> Result<bool, BackendError> {
        Err(BackendError::Unavailable("circuit open".to_string()))
    }

    async fn delete(&self, _collection: Collection, _id: &str) -> Result<bool, BackendError> {
        Err(BackendError::Unavailable("circuit open".to_string()))
    }
}

#[tokio::test]
async fn test_backend_failure_is_bad_gateway() {
    let app = create_app(AppState::new(
        Settings::default(),
        Arc::new(UnavailableBackend),
    ));

    let (status, _, body) = send(&app, request("GET", "/api/v1/messages/any", None)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");

    let (status, _, _) = send(
        &app,
        request("POST", "/api/v1/preview", Some(json!({"templateId": "any"}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}
