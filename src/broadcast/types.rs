use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::content::ContentError;

#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("Broadcast not found: {0}")]
    NotFound(String),

    #[error("Invalid broadcast: {0}")]
    Invalid(String),

    #[error(transparent)]
    Content(#[from] ContentError),
}

/// Who receives a broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Device,
    Group,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Device => "device",
            TargetKind::Group => "group",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastTarget {
    pub kind: TargetKind,
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastStatus {
    Sent,
    Failed,
}

impl BroadcastStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BroadcastStatus::Sent => "sent",
            BroadcastStatus::Failed => "failed",
        }
    }
}

/// Record of one triggered broadcast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Broadcast {
    pub id: Uuid,
    pub message_id: String,
    pub target: BroadcastTarget,
    pub status: BroadcastStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Rendered title at trigger time
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Filters for searching broadcast history
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BroadcastQuery {
    /// Case-insensitive substring of the title or message ID
    pub q: Option<String>,
    pub status: Option<BroadcastStatus>,
    pub limit: Option<usize>,
}

impl BroadcastQuery {
    pub fn matches(&self, broadcast: &Broadcast) -> bool {
        if let Some(status) = self.status {
            if broadcast.status != status {
                return false;
            }
        }

        match self.q.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => {
                let needle = q.to_lowercase();
                broadcast.title.to_lowercase().contains(&needle)
                    || broadcast.message_id.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}
