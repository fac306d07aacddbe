//! Upstream news sources.
//!
//! The news layer only talks to a [`NewsSource`]. The production source is
//! [`GNewsClient`]; [`OfflineSource`] stands in when no API key is
//! configured, so every feed is served from synthetic content.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod client;

pub use client::GNewsClient;

use crate::config::UpstreamConfig;
use crate::error::{Result, UpstreamError};
use crate::models::{FeedQuery, UpstreamPayload};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Something that can answer a [`FeedQuery`].
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch(&self, query: &FeedQuery) -> std::result::Result<UpstreamPayload, UpstreamError>;
}

/// Source used when no upstream is configured. Always unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineSource;

#[async_trait]
impl NewsSource for OfflineSource {
    async fn fetch(&self, _query: &FeedQuery) -> std::result::Result<UpstreamPayload, UpstreamError> {
        Err(UpstreamError::Unavailable)
    }
}

/// Pick the source for `config`: the HTTP client when an API key is set,
/// the offline source otherwise.
pub fn from_config(config: &UpstreamConfig) -> Result<Arc<dyn NewsSource>> {
    match config.api_key() {
        Some(_) => {
            info!("Using upstream news API at {}", config.base_url);
            Ok(Arc::new(GNewsClient::new(config)?))
        }
        None => {
            warn!("No upstream API key configured; serving synthetic content only");
            Ok(Arc::new(OfflineSource))
        }
    }
}
