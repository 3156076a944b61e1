// Rendering core
pub mod render;

// Storage
pub mod content;
pub mod postgres;

// Domain services
pub mod broadcast;
pub mod preview;
pub mod ratelimit;

// Application layer
pub mod api;
pub mod server;

// Supporting modules
pub mod config;
pub mod error;
pub mod metrics;
pub mod tasks;
pub mod telemetry;
