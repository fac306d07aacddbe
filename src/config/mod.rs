// Configuration module
// Author: kelexine (https://github.com/kelexine)

mod models;

pub use models::*;

use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest, prefix `HEADLINE_CACHE__`)
    /// 2. Config file (`path`, or `~/.headline-cache/config.toml`)
    /// 3. Defaults (lowest)
    ///
    /// CLI flags are applied on top by the binary.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            // An explicit path must exist; the default one is optional
            .add_source(File::from(file).required(path.is_some()))
            // e.g. HEADLINE_CACHE__UPSTREAM__API_KEY
            .add_source(
                Environment::with_prefix("HEADLINE_CACHE")
                    .separator("__")
            )
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings that would stall or disable the news layer.
    pub fn validate(&self) -> Result<()> {
        if self.news.max_cache_entries == 0 {
            return Err(AppError::Config("news.max_cache_entries must be > 0".into()));
        }
        if self.news.task_timeout_seconds == 0 {
            return Err(AppError::Config("news.task_timeout_seconds must be > 0".into()));
        }
        if !(10..=50).contains(&self.news.fallback_batch_size) {
            return Err(AppError::Config(format!(
                "news.fallback_batch_size must be within 10..=50, got {}",
                self.news.fallback_batch_size
            )));
        }
        if self.news.max_cooldown_seconds < self.news.throttle_cooldown_seconds {
            return Err(AppError::Config(
                "news.max_cooldown_seconds must be >= news.throttle_cooldown_seconds".into(),
            ));
        }
        Ok(())
    }

    fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".headline-cache")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.news.cache_ttl_seconds, 7200);
        assert_eq!(config.news.min_request_interval_ms, 3000);
        assert_eq!(config.markets.cache_ttl_seconds, 300);
        assert!(config.upstream.api_key.is_none());
    }

    #[test]
    fn test_rejects_out_of_range_batch() {
        let mut config = AppConfig::default();
        config.news.fallback_batch_size = 5;
        assert!(config.validate().is_err());

        config.news.fallback_batch_size = 51;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_cooldown() {
        let mut config = AppConfig::default();
        config.news.throttle_cooldown_seconds = 120;
        config.news.max_cooldown_seconds = 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let mut config = AppConfig::default();
        config.upstream.api_key = Some("  ".to_string());
        assert_eq!(config.upstream.api_key(), None);

        config.upstream.api_key = Some(" abc ".to_string());
        assert_eq!(config.upstream.api_key(), Some("abc"));
    }
}
