//! Preview rendering of stored templates and messages.

mod service;

pub use service::{PreviewService, PreviewSource, PreviewStats, PreviewStatsSnapshot};
