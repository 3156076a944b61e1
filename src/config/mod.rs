mod settings;

pub use settings::{
    ApiConfig, BroadcastConfig, ContentConfig, DatabaseConfig, OtelConfig, PreviewConfig,
    ServerConfig, Settings,
};
