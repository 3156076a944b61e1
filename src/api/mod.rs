//! API layer - HTTP endpoint handlers organized by domain.

mod broadcast;
mod content;
mod health;
mod metrics;
mod preview;
mod routes;

pub use broadcast::{
    get_broadcast, search_broadcasts, trigger_broadcast, BroadcastListResponse,
    TriggerBroadcastRequest,
};
pub use content::{
    create_document, delete_document, get_document, get_message, get_template, list_documents,
    update_document, DraftQuery, ListResponse,
};
pub use health::{health, HealthResponse};
pub use metrics::prometheus_metrics;
pub use preview::{preview, PreviewRequest, PreviewResponse};
pub use routes::api_routes;
