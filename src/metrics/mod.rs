// Metrics module for Prometheus observability
// Author: kelexine (https://github.com/kelexine)

mod registry;

pub use registry::{
    gather_metrics,
    UPSTREAM_REQUESTS,
    UPSTREAM_DURATION,
    FALLBACK_ACTIVATIONS,
    QUEUE_WAIT,
    QUEUE_DEPTH,
    NEWS_CACHE_OPERATIONS,
    NEWS_CACHE_ENTRIES,
    BACKGROUND_REFRESH,
    DEDUP_DROPPED,
    MARKET_CACHE_OPERATIONS,
};

/// Helper to record upstream call metrics
pub fn record_upstream_call(endpoint: &str, outcome: &str, duration_secs: f64) {
    UPSTREAM_REQUESTS
        .with_label_values(&[endpoint, outcome])
        .inc();

    UPSTREAM_DURATION
        .with_label_values(&[endpoint])
        .observe(duration_secs);
}

/// Helper to record a fallback activation
pub fn record_fallback(reason: &str) {
    FALLBACK_ACTIVATIONS.with_label_values(&[reason]).inc();
}

/// Helpers for the request queue
pub fn record_queue_wait(seconds: f64) {
    QUEUE_WAIT.observe(seconds);
}

pub fn update_queue_depth(depth: usize) {
    QUEUE_DEPTH.with_label_values(&["upstream"]).set(depth as f64);
}

/// Helpers for the news cache
pub fn record_cache_hit() {
    NEWS_CACHE_OPERATIONS.with_label_values(&["hit"]).inc();
}

pub fn record_cache_stale() {
    NEWS_CACHE_OPERATIONS.with_label_values(&["stale"]).inc();
}

pub fn record_cache_miss() {
    NEWS_CACHE_OPERATIONS.with_label_values(&["miss"]).inc();
}

pub fn record_cache_store() {
    NEWS_CACHE_OPERATIONS.with_label_values(&["store"]).inc();
}

pub fn record_cache_eviction() {
    NEWS_CACHE_OPERATIONS.with_label_values(&["evict"]).inc();
}

pub fn record_cache_coalesced() {
    NEWS_CACHE_OPERATIONS.with_label_values(&["coalesced"]).inc();
}

pub fn update_cache_entries(count: usize) {
    NEWS_CACHE_ENTRIES.with_label_values(&["active"]).set(count as f64);
}

/// Helper to record background refresh outcomes
pub fn record_background_refresh(outcome: &str) {
    BACKGROUND_REFRESH.with_label_values(&[outcome]).inc();
}

pub fn record_dedup_dropped(count: usize) {
    if count > 0 {
        DEDUP_DROPPED.inc_by(count as u64);
    }
}

/// Helper to record market widget cache operations
pub fn record_market_cache(feed: &str, hit: bool) {
    let operation = if hit { "hit" } else { "generate" };
    MARKET_CACHE_OPERATIONS.with_label_values(&[feed, operation]).inc();
}
