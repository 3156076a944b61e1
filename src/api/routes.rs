use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::content::{BrandingPackage, Message, Template, VariableDefinition};
use crate::server::middleware::{api_key_auth, preview_rate_limit, preview_secret};
use crate::server::AppState;

use super::broadcast::{get_broadcast, search_broadcasts, trigger_broadcast};
use super::content::{
    create_document, delete_document, get_document, get_message, get_template, list_documents,
    update_document,
};
use super::health::health;
use super::metrics::prometheus_metrics;
use super::preview::preview;

pub fn api_routes(state: AppState) -> Router<AppState> {
    // Public reads
    let public = Router::new()
        .route("/messages/{id}", get(get_message))
        .route("/templates/{id}", get(get_template));

    // Preview: secret check runs before the rate limiter
    let preview_routes = Router::new()
        .route("/preview", post(preview))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            preview_rate_limit,
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), preview_secret));

    // Management console operations
    let management = Router::new()
        .route(
            "/templates",
            get(list_documents::<Template>).post(create_document::<Template>),
        )
        .route(
            "/templates/{id}",
            put(update_document::<Template>).delete(delete_document::<Template>),
        )
        .route(
            "/messages",
            get(list_documents::<Message>).post(create_document::<Message>),
        )
        .route(
            "/messages/{id}",
            put(update_document::<Message>).delete(delete_document::<Message>),
        )
        .route(
            "/brandings",
            get(list_documents::<BrandingPackage>).post(create_document::<BrandingPackage>),
        )
        .route(
            "/brandings/{id}",
            get(get_document::<BrandingPackage>)
                .put(update_document::<BrandingPackage>)
                .delete(delete_document::<BrandingPackage>),
        )
        .route(
            "/variables",
            get(list_documents::<VariableDefinition>)
                .post(create_document::<VariableDefinition>),
        )
        .route(
            "/variables/{id}",
            get(get_document::<VariableDefinition>)
                .put(update_document::<VariableDefinition>)
                .delete(delete_document::<VariableDefinition>),
        )
        .route("/broadcasts", get(search_broadcasts).post(trigger_broadcast))
        .route("/broadcasts/{id}", get(get_broadcast))
        .route_layer(middleware::from_fn_with_state(state, api_key_auth));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .nest("/api/v1", public.merge(preview_routes).merge(management))
}
