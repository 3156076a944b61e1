//! Delivery seam for rendered broadcasts.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::render::Preview;

use super::types::BroadcastTarget;

#[derive(Debug, Error)]
#[error("Delivery failed: {0}")]
pub struct SinkError(pub String);

/// Rendered payload handed to a sink
#[derive(Debug, Clone)]
pub struct BroadcastPayload {
    pub broadcast_id: Uuid,
    pub message_id: String,
    pub preview: Preview,
}

/// Delivers rendered broadcasts to devices or groups.
#[async_trait]
pub trait BroadcastSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(
        &self,
        target: &BroadcastTarget,
        payload: &BroadcastPayload,
    ) -> Result<(), SinkError>;
}

/// Sink that only logs what would be delivered.
#[derive(Debug, Default)]
pub struct LoggingBroadcastSink;

#[async_trait]
impl BroadcastSink for LoggingBroadcastSink {
    fn name(&self) -> &'static str {
        "logging"
    }

    async fn deliver(
        &self,
        target: &BroadcastTarget,
        payload: &BroadcastPayload,
    ) -> Result<(), SinkError> {
        tracing::info!(
            broadcast_id = %payload.broadcast_id,
            message_id = %payload.message_id,
            target_kind = target.kind.as_str(),
            target_id = %target.id,
            title = %payload.preview.title,
            "Broadcast delivered"
        );
        Ok(())
    }
}
