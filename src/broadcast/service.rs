use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::metrics::BroadcastMetrics;
use crate::preview::PreviewService;
use crate::render::Variables;

use super::sink::{BroadcastPayload, BroadcastSink};
use super::types::{Broadcast, BroadcastError, BroadcastQuery, BroadcastStatus, BroadcastTarget};

/// Default page size for history searches
const DEFAULT_SEARCH_LIMIT: usize = 50;

/// Renders messages, hands them to a sink and keeps a bounded history.
pub struct BroadcastService {
    preview: Arc<PreviewService>,
    sink: Arc<dyn BroadcastSink>,
    history: DashMap<Uuid, Broadcast>,
    history_limit: usize,
}

impl BroadcastService {
    pub fn new(
        preview: Arc<PreviewService>,
        sink: Arc<dyn BroadcastSink>,
        history_limit: usize,
    ) -> Self {
        Self {
            preview,
            sink,
            history: DashMap::new(),
            history_limit: history_limit.max(1),
        }
    }

    /// Render `message_id` and deliver it to `target`.
    ///
    /// Content errors abort before anything is recorded. A delivery failure
    /// is recorded as a `failed` broadcast and still returned as `Ok`.
    pub async fn trigger(
        &self,
        message_id: &str,
        target: BroadcastTarget,
        variables: &Variables,
        include_drafts: bool,
    ) -> Result<Broadcast, BroadcastError> {
        if target.id.trim().is_empty() {
            return Err(BroadcastError::Invalid(
                "Target ID cannot be empty".to_string(),
            ));
        }

        let preview = self
            .preview
            .preview_message(message_id, include_drafts, variables)
            .await?;

        let payload = BroadcastPayload {
            broadcast_id: Uuid::new_v4(),
            message_id: message_id.to_string(),
            preview,
        };

        let (status, error) = match self.sink.deliver(&target, &payload).await {
            Ok(()) => (BroadcastStatus::Sent, None),
            Err(e) => {
                tracing::warn!(
                    broadcast_id = %payload.broadcast_id,
                    sink = self.sink.name(),
                    error = %e,
                    "Broadcast delivery failed"
                );
                (BroadcastStatus::Failed, Some(e.to_string()))
            }
        };

        BroadcastMetrics::record_broadcast(target.kind.as_str(), status.as_str());

        let broadcast = Broadcast {
            id: payload.broadcast_id,
            message_id: payload.message_id,
            target,
            status,
            error,
            title: payload.preview.title,
            created_at: Utc::now(),
        };

        self.record(broadcast.clone());
        Ok(broadcast)
    }

    pub fn get(&self, id: Uuid) -> Result<Broadcast, BroadcastError> {
        self.history
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BroadcastError::NotFound(id.to_string()))
    }

    /// Matching broadcasts, newest first.
    pub fn search(&self, query: &BroadcastQuery) -> Vec<Broadcast> {
        let mut matches: Vec<Broadcast> = self
            .history
            .iter()
            .filter(|entry| query.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matches.truncate(query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT));
        matches
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn record(&self, broadcast: Broadcast) {
        self.history.insert(broadcast.id, broadcast);

        while self.history.len() > self.history_limit {
            let oldest = self
                .history
                .iter()
                .min_by_key(|entry| entry.value().created_at)
                .map(|entry| *entry.key());
            match oldest {
                Some(id) => {
                    self.history.remove(&id);
                }
                None => break,
            }
        }

        BroadcastMetrics::set_history_size(self.history.len());
    }
}
