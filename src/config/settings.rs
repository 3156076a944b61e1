use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::ratelimit::RateLimitConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub ratelimit: RateLimitConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    #[serde(default)]
    pub otel: OtelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Maximum accepted request body in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    /// Key required in `X-API-Key` for management routes (none = open)
    pub key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewConfig {
    /// Shared secret required in `X-Preview-Secret` (none = not checked)
    pub shared_secret: Option<String>,
    /// Maximum number of caller-supplied variables
    #[serde(default = "default_max_variables")]
    pub max_variables: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    /// Backend type: "memory" or "postgres"
    #[serde(default = "default_content_backend")]
    pub backend: String,
    /// Optional JSON seed file loaded at startup
    pub seed_path: Option<String>,
    /// Default branding cache TTL in seconds
    #[serde(default = "default_branding_cache_ttl")]
    pub branding_cache_ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastConfig {
    /// Number of broadcast records kept for polling/search
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_body_limit() -> usize {
    1024 * 1024 // 1 MiB
}

fn default_max_variables() -> usize {
    200
}

fn default_content_backend() -> String {
    "memory".to_string()
}

fn default_branding_cache_ttl() -> u64 {
    60
}

fn default_database_url() -> String {
    "postgres://localhost:5432/comms".to_string()
}

fn default_pool_size() -> u32 {
    10
}

fn default_connect_timeout() -> u32 {
    5
}

fn default_idle_timeout() -> u32 {
    600
}

fn default_history_limit() -> usize {
    1000
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "comms-preview-service".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8081)?
            .set_default("content.backend", "memory")?
            .set_default("ratelimit.enabled", true)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // SERVER__PORT, API__KEY, PREVIEW__SHARED_SECRET, CONTENT__BACKEND, DATABASE__URL, etc.
            .add_source(
                Environment::default()
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins"),
            );

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            api: ApiConfig::default(),
            preview: PreviewConfig::default(),
            ratelimit: RateLimitConfig::default(),
            content: ContentConfig::default(),
            database: DatabaseConfig::default(),
            broadcast: BroadcastConfig::default(),
            otel: OtelConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            shared_secret: None,
            max_variables: default_max_variables(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            backend: default_content_backend(),
            seed_path: None,
            branding_cache_ttl_seconds: default_branding_cache_ttl(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            pool_size: default_pool_size(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
        }
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8081);
        assert_eq!(settings.content.backend, "memory");
        assert!(settings.api.key.is_none());
        assert!(settings.preview.shared_secret.is_none());
        assert_eq!(settings.server_addr(), "0.0.0.0:8081");
    }
}
