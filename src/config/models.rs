//! Configuration data structures for headline-cache.
//!
//! This module defines the schema for the application settings: the HTTP
//! surface, the upstream news API, the news cache and queue, the market
//! widgets and logging.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings (host, port).
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream news API settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// News cache, queue and fallback settings.
    #[serde(default)]
    pub news: NewsConfig,

    /// Market widget settings.
    #[serde(default)]
    pub markets: MarketsConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `127.0.0.1`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `8080`
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Settings for the upstream news search/headlines API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the news API.
    /// Default: `https://gnews.io/api/v4`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key shared by every request. Without one, only synthetic
    /// content is served.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Default: `pt`
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Default: `br`
    #[serde(default = "default_country")]
    pub country: String,

    /// Result cap sent when a query does not set its own.
    /// Default: `25`
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// HTTP request timeout in seconds.
    /// Default: `10`
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Settings for the news cache, the request queue and fallback synthesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// How long upstream content stays fresh.
    /// Default: `7200` (2 hours)
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,

    /// How long synthetic content stays fresh.
    /// Default: `300`
    #[serde(default = "default_fallback_ttl")]
    pub fallback_ttl_seconds: u64,

    /// Minimum time between two background refreshes of one key.
    /// Default: `900` (15 minutes)
    #[serde(default = "default_revalidate_window")]
    pub revalidate_window_seconds: u64,

    /// Minimum spacing between two upstream dispatches.
    /// Default: `3000`
    #[serde(default = "default_min_interval")]
    pub min_request_interval_ms: u64,

    /// Upper bound on a single queued upstream task.
    /// Default: `15`
    #[serde(default = "default_task_timeout")]
    pub task_timeout_seconds: u64,

    /// Maximum number of cached feeds.
    /// Default: `256`
    #[serde(default = "default_max_entries")]
    pub max_cache_entries: usize,

    /// Number of synthetic articles per fallback activation (10..=50).
    /// Default: `12`
    #[serde(default = "default_fallback_batch")]
    pub fallback_batch_size: usize,

    /// Initial cooldown after the upstream throttles us.
    /// Default: `60`
    #[serde(default = "default_throttle_cooldown")]
    pub throttle_cooldown_seconds: u64,

    /// Cap for the growing cooldown.
    /// Default: `900`
    #[serde(default = "default_max_cooldown")]
    pub max_cooldown_seconds: u64,
}

/// Settings for the market/trend widgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketsConfig {
    /// Default: `300` (5 minutes)
    #[serde(default = "default_markets_ttl")]
    pub cache_ttl_seconds: u64,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl UpstreamConfig {
    /// The API key, if one is set and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

impl NewsConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn fallback_ttl(&self) -> Duration {
        Duration::from_secs(self.fallback_ttl_seconds)
    }

    pub fn revalidate_window(&self) -> Duration {
        Duration::from_secs(self.revalidate_window_seconds)
    }

    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_seconds)
    }

    pub fn throttle_cooldown(&self) -> Duration {
        Duration::from_secs(self.throttle_cooldown_seconds)
    }

    pub fn max_cooldown(&self) -> Duration {
        Duration::from_secs(self.max_cooldown_seconds)
    }
}

// Default trait implementations linking to custom logic

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            lang: default_lang(),
            country: default_country(),
            max_results: default_max_results(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: default_cache_ttl(),
            fallback_ttl_seconds: default_fallback_ttl(),
            revalidate_window_seconds: default_revalidate_window(),
            min_request_interval_ms: default_min_interval(),
            task_timeout_seconds: default_task_timeout(),
            max_cache_entries: default_max_entries(),
            fallback_batch_size: default_fallback_batch(),
            throttle_cooldown_seconds: default_throttle_cooldown(),
            max_cooldown_seconds: default_max_cooldown(),
        }
    }
}

impl Default for MarketsConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: default_markets_ttl(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Helper functions for serde defaults
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_base_url() -> String {
    "https://gnews.io/api/v4".to_string()
}

fn default_lang() -> String {
    "pt".to_string()
}

fn default_country() -> String {
    "br".to_string()
}

fn default_max_results() -> u32 {
    25
}

fn default_timeout() -> u64 {
    10
}

fn default_cache_ttl() -> u64 {
    2 * 60 * 60
}

fn default_fallback_ttl() -> u64 {
    300
}

fn default_revalidate_window() -> u64 {
    15 * 60
}

fn default_min_interval() -> u64 {
    3000
}

fn default_task_timeout() -> u64 {
    15
}

fn default_max_entries() -> usize {
    256
}

fn default_fallback_batch() -> usize {
    12
}

fn default_throttle_cooldown() -> u64 {
    60
}

fn default_max_cooldown() -> u64 {
    900
}

fn default_markets_ttl() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
