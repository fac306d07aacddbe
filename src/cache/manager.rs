// Cache manager - TTL bookkeeping and lookup for cached feeds
// Author: kelexine (https://github.com/kelexine)

use crate::cache::models::{CacheConfig, CacheEntry, CacheStats, Feed, Lookup};
use crate::metrics;
use crate::models::Provenance;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use tokio::time::Instant;
use tracing::debug;

/// Bounded feed cache with stale-while-revalidate bookkeeping.
///
/// Entries are never dropped for being stale; only capacity pressure or
/// [`ResponseCache::clear`] removes them, so a stale feed can always be
/// served while a refresh runs.
pub struct ResponseCache {
    config: CacheConfig,
    entries: Mutex<LruCache<String, CacheEntry>>,
    stats: Mutex<CacheStats>,
}

impl ResponseCache {
    /// Create a new cache manager
    pub fn new(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            config,
            entries: Mutex::new(LruCache::new(capacity)),
            stats: Mutex::new(CacheStats::default()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Look up `key` at `now`.
    ///
    /// For a stale entry, the revalidation timestamp is claimed under the
    /// same lock, so concurrent callers cannot both trigger a refresh.
    pub fn lookup(&self, key: &str, now: Instant) -> Lookup {
        let window = self.config.revalidate_window;
        let lookup = match self.entries.lock().get_mut(key) {
            None => Lookup::Miss,
            Some(entry) if entry.is_fresh(now) => Lookup::Fresh(entry.items.clone()),
            Some(entry) => {
                let revalidate = entry
                    .last_revalidation
                    .map_or(true, |at| now.saturating_duration_since(at) >= window);
                if revalidate {
                    entry.last_revalidation = Some(now);
                }
                Lookup::Stale {
                    items: entry.items.clone(),
                    revalidate,
                }
            }
        };

        let mut stats = self.stats.lock();
        match &lookup {
            Lookup::Fresh(_) => {
                stats.hits += 1;
                metrics::record_cache_hit();
            }
            Lookup::Stale { revalidate, .. } => {
                debug!(key, revalidate, "Serving stale feed");
                stats.stale_hits += 1;
                metrics::record_cache_stale();
            }
            Lookup::Miss => {
                stats.misses += 1;
                metrics::record_cache_miss();
            }
        }
        lookup
    }

    /// Items currently stored under `key`, regardless of freshness.
    /// Does not touch statistics or recency.
    pub fn peek(&self, key: &str) -> Option<Feed> {
        self.entries.lock().peek(key).map(|e| e.items.clone())
    }

    /// Store a feed. The TTL depends on where the content came from.
    pub fn store(&self, key: &str, items: Feed, provenance: Provenance, now: Instant) {
        let ttl = match provenance {
            Provenance::Upstream => self.config.ttl,
            Provenance::Synthetic => self.config.fallback_ttl,
        };
        let entry = CacheEntry {
            items,
            stored_at: now,
            ttl,
            provenance,
            last_revalidation: None,
        };

        let mut entries = self.entries.lock();
        let evicted = match entries.push(key.to_string(), entry) {
            Some((old_key, _)) => old_key != key,
            None => false,
        };
        let len = entries.len();
        drop(entries);

        let mut stats = self.stats.lock();
        stats.stores += 1;
        metrics::record_cache_store();
        if evicted {
            stats.evictions += 1;
            metrics::record_cache_eviction();
            debug!("Evicted least recently used feed to make room for {}", key);
        }
        metrics::update_cache_entries(len);
    }

    /// Provenance of the entry under `key`, if any.
    pub fn provenance(&self, key: &str) -> Option<Provenance> {
        self.entries.lock().peek(key).map(|e| e.provenance)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<String> {
        self.entries.lock().iter().map(|(k, _)| k.clone()).collect()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.stats.lock().clone()
    }

    /// Clear all cached entries
    pub fn clear(&self) {
        self.entries.lock().clear();
        metrics::update_cache_entries(0);
        debug!("Feed cache cleared");
    }

    pub fn reset_stats(&self) {
        *self.stats.lock() = CacheStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentItem, ItemStatus};
    use chrono::Utc;
    use std::time::Duration;

    fn feed(title: &str) -> Feed {
        vec![ContentItem {
            id: 1,
            title: title.to_string(),
            summary: String::new(),
            content: None,
            image_url: String::new(),
            category: "GERAL".to_string(),
            published_at: Utc::now(),
            source: "Teste".to_string(),
            url: "#".to_string(),
            views: 100,
            status: ItemStatus::Published,
            is_main: true,
            provenance: Provenance::Upstream,
        }]
        .into()
    }

    fn config() -> CacheConfig {
        CacheConfig {
            ttl: Duration::from_secs(60),
            fallback_ttl: Duration::from_secs(10),
            revalidate_window: Duration::from_secs(30),
            max_entries: 2,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_then_stale() {
        let cache = ResponseCache::new(config());
        let now = Instant::now();
        assert!(matches!(cache.lookup("k", now), Lookup::Miss));

        cache.store("k", feed("A"), Provenance::Upstream, now);
        assert!(matches!(cache.lookup("k", now + Duration::from_secs(59)), Lookup::Fresh(_)));

        let later = now + Duration::from_secs(61);
        match cache.lookup("k", later) {
            Lookup::Stale { items, revalidate } => {
                assert_eq!(items[0].title, "A");
                assert!(revalidate);
            }
            other => panic!("expected stale, got {:?}", other),
        }
        // Same window: nobody else gets to revalidate
        match cache.lookup("k", later + Duration::from_secs(5)) {
            Lookup::Stale { revalidate, .. } => assert!(!revalidate),
            other => panic!("expected stale, got {:?}", other),
        }
        // Window elapsed: one more revalidation is allowed
        match cache.lookup("k", later + Duration::from_secs(31)) {
            Lookup::Stale { revalidate, .. } => assert!(revalidate),
            other => panic!("expected stale, got {:?}", other),
        }

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.stale_hits, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_synthetic_content_expires_sooner() {
        let cache = ResponseCache::new(config());
        let now = Instant::now();
        cache.store("k", feed("A"), Provenance::Synthetic, now);
        assert!(matches!(
            cache.lookup("k", now + Duration::from_secs(11)),
            Lookup::Stale { .. }
        ));
        assert_eq!(cache.provenance("k"), Some(Provenance::Synthetic));
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_evicts_least_recently_used() {
        let cache = ResponseCache::new(config());
        let now = Instant::now();
        cache.store("a", feed("A"), Provenance::Upstream, now);
        cache.store("b", feed("B"), Provenance::Upstream, now);
        // Touch "a" so "b" becomes the eviction candidate
        cache.lookup("a", now);
        cache.store("c", feed("C"), Provenance::Upstream, now);

        assert_eq!(cache.len(), 2);
        assert!(cache.peek("a").is_some());
        assert!(cache.peek("b").is_none());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_is_not_an_eviction() {
        let cache = ResponseCache::new(config());
        let now = Instant::now();
        cache.store("a", feed("A"), Provenance::Upstream, now);
        cache.store("a", feed("A2"), Provenance::Upstream, now);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().evictions, 0);
        assert_eq!(cache.peek("a").unwrap()[0].title, "A2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear() {
        let cache = ResponseCache::new(config());
        cache.store("a", feed("A"), Provenance::Upstream, Instant::now());
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.keys().is_empty());
    }
}
