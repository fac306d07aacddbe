//! Cache configuration, entries and statistics models.

// Author: kelexine (https://github.com/kelexine)

use crate::config::NewsConfig;
use crate::models::{ContentItem, Provenance};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Shared, immutable feed contents.
pub type Feed = Arc<[ContentItem]>;

/// Configuration for the feed cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Freshness window for upstream content.
    pub ttl: Duration,
    /// Freshness window for synthetic content.
    pub fallback_ttl: Duration,
    /// Minimum time between two background refreshes of the same key.
    pub revalidate_window: Duration,
    /// Maximum number of cached feeds; least recently used go first.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    /// Provides default values for cache configuration.
    ///
    /// - `ttl`: 2 hours
    /// - `fallback_ttl`: 5 minutes
    /// - `revalidate_window`: 15 minutes
    /// - `max_entries`: 256
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(2 * 60 * 60),
            fallback_ttl: Duration::from_secs(5 * 60),
            revalidate_window: Duration::from_secs(15 * 60),
            max_entries: 256,
        }
    }
}

impl From<&NewsConfig> for CacheConfig {
    fn from(config: &NewsConfig) -> Self {
        Self {
            ttl: config.cache_ttl(),
            fallback_ttl: config.fallback_ttl(),
            revalidate_window: config.revalidate_window(),
            max_entries: config.max_cache_entries.max(1),
        }
    }
}

/// One cached feed.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub items: Feed,
    pub stored_at: Instant,
    pub ttl: Duration,
    pub provenance: Provenance,
    /// When a background refresh was last dispatched for this key.
    pub last_revalidation: Option<Instant>,
}

impl CacheEntry {
    pub fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < self.ttl
    }
}

/// Result of a cache lookup.
#[derive(Debug, Clone)]
pub enum Lookup {
    Fresh(Feed),
    /// Past its TTL. `revalidate` is set for exactly one caller per
    /// revalidation window.
    Stale { items: Feed, revalidate: bool },
    Miss,
}

/// Statistics for cache operations.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CacheStats {
    /// Lookups answered with fresh data.
    pub hits: u64,
    /// Lookups answered with stale data.
    pub stale_hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Entries written.
    pub stores: u64,
    /// Entries pushed out by the capacity bound.
    pub evictions: u64,
}

/// Snapshot returned by `cache_stats`.
#[derive(Debug, Clone, Serialize)]
pub struct CacheReport {
    pub size: usize,
    pub keys: Vec<String>,
    pub used_titles: usize,
    pub pending_requests: usize,
    pub stats: CacheStats,
}
