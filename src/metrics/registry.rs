// Prometheus metrics registry and collectors
// Author: kelexine (https://github.com/kelexine)

use lazy_static::lazy_static;
use prometheus::{
    CounterVec, HistogramVec, GaugeVec, Histogram, IntCounter, Opts, Registry, TextEncoder, Encoder,
    register_counter_vec_with_registry, register_histogram_vec_with_registry,
    register_gauge_vec_with_registry, register_histogram_with_registry,
    register_int_counter_with_registry,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // UPSTREAM METRICS
    // ============================================================================

    /// Upstream calls by endpoint and outcome
    pub static ref UPSTREAM_REQUESTS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("upstream_requests_total", "Total upstream news API calls"),
        &["endpoint", "outcome"], // outcome: success, throttled, timeout, ...
        REGISTRY
    ).unwrap();

    /// Upstream call duration
    pub static ref UPSTREAM_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("upstream_request_duration_seconds", "Upstream call duration")
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["endpoint"],
        REGISTRY
    ).unwrap();

    /// Fallback synthesis activations, so upstream outages stay visible
    pub static ref FALLBACK_ACTIVATIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("fallback_activations_total", "Times synthetic content replaced upstream content"),
        &["reason"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // QUEUE METRICS
    // ============================================================================

    /// Time a task spent queued before dispatch
    pub static ref QUEUE_WAIT: Histogram = register_histogram_with_registry!(
        prometheus::HistogramOpts::new("queue_wait_seconds", "Time spent waiting in the request queue")
            .buckets(vec![0.0, 0.1, 0.5, 1.0, 3.0, 6.0, 15.0, 30.0, 60.0]),
        REGISTRY
    ).unwrap();

    /// Tasks waiting in the request queue
    pub static ref QUEUE_DEPTH: GaugeVec = register_gauge_vec_with_registry!(
        Opts::new("request_queue_depth", "Tasks waiting in the request queue"),
        &["queue"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // CACHE METRICS
    // ============================================================================

    /// News cache operations
    pub static ref NEWS_CACHE_OPERATIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("news_cache_operations_total", "Total news cache operations"),
        &["operation"], // operation: hit, stale, miss, store, evict, coalesced
        REGISTRY
    ).unwrap();

    /// Current news cache entries
    pub static ref NEWS_CACHE_ENTRIES: GaugeVec = register_gauge_vec_with_registry!(
        Opts::new("news_cache_entries", "Current number of cached feeds"),
        &["type"], // type: active
        REGISTRY
    ).unwrap();

    /// Background stale-while-revalidate refreshes
    pub static ref BACKGROUND_REFRESH: CounterVec = register_counter_vec_with_registry!(
        Opts::new("background_refresh_total", "Background refreshes by outcome"),
        &["outcome"], // outcome: refreshed, failed
        REGISTRY
    ).unwrap();

    /// Articles dropped because their title was already surfaced
    pub static ref DEDUP_DROPPED: IntCounter = register_int_counter_with_registry!(
        Opts::new("dedup_dropped_total", "Articles dropped as duplicate titles"),
        REGISTRY
    ).unwrap();

    /// Market widget cache operations
    pub static ref MARKET_CACHE_OPERATIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("market_cache_operations_total", "Total market widget cache operations"),
        &["feed", "operation"], // operation: hit, generate
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
