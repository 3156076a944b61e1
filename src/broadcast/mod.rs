//! Broadcast triggering: render a stored message and deliver it to a device
//! or group, keeping a searchable history of what was sent.

mod service;
mod sink;
mod types;

pub use service::BroadcastService;
pub use sink::{BroadcastPayload, BroadcastSink, LoggingBroadcastSink, SinkError};
pub use types::{
    Broadcast, BroadcastError, BroadcastQuery, BroadcastStatus, BroadcastTarget, TargetKind,
};
