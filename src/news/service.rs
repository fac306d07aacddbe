//! The news service: cached, rate-limited, deduplicated feeds that never
//! fail.
//!
//! Every feed request goes through [`NewsService::fetch_feed`]:
//!
//! - a fresh cache entry is returned as is;
//! - a stale entry is returned immediately and, at most once per
//!   revalidation window, refreshed in the background;
//! - a miss is loaded through the shared request queue, with concurrent
//!   misses for the same key coalesced into a single upstream call.
//!
//! Any upstream failure is masked by synthetic content, which is cached
//! with a shorter TTL. Payloads of both kinds are deduplicated by title on
//! the way into the cache.

// Author: kelexine (https://github.com/kelexine)

use super::convert::ItemFactory;
use super::dedup::{normalize, Claim, TitleRegistry};
use super::fallback::FallbackSynthesizer;
use crate::cache::{CacheConfig, CacheReport, Feed, Lookup, ResponseCache};
use crate::config::NewsConfig;
use crate::error::UpstreamError;
use crate::metrics;
use crate::models::{Category, ContentItem, FeedQuery, Provenance, RawArticle, UpstreamPayload};
use crate::upstream::NewsSource;
use crate::utils::queue::RequestQueue;
use crate::utils::throttle::ThrottleGate;
use chrono::Utc;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

const REFRESH_EVENT_CAPACITY: usize = 64;

/// Result of one background refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The entry was replaced with `items` upstream items.
    Refreshed { items: usize },
    /// The stale entry was kept.
    Failed { reason: &'static str },
}

impl RefreshOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshOutcome::Refreshed { .. } => "refreshed",
            RefreshOutcome::Failed { .. } => "failed",
        }
    }
}

/// Published on the refresh channel when a background refresh finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshEvent {
    pub key: String,
    pub outcome: RefreshOutcome,
}

type InflightFeed = Shared<BoxFuture<'static, Feed>>;

struct Inner {
    source: Arc<dyn NewsSource>,
    queue: RequestQueue,
    cache: ResponseCache,
    titles: TitleRegistry,
    synthesizer: FallbackSynthesizer,
    throttle: ThrottleGate,
    factory: ItemFactory,
    inflight: Mutex<HashMap<String, (u64, InflightFeed)>>,
    // Bumped by reset; loads from an older generation must not write.
    generation: AtomicU64,
    refreshes: Mutex<HashMap<String, AbortHandle>>,
    // Serializes synthesis with ingestion so concurrent fallbacks cannot
    // pick the same unused titles.
    fallback_lock: Mutex<()>,
    events: broadcast::Sender<RefreshEvent>,
}

/// News context object. Cloning is cheap and shares all state.
///
/// Must be created inside a Tokio runtime: the request queue spawns its
/// drainer on construction.
#[derive(Clone)]
pub struct NewsService {
    inner: Arc<Inner>,
}

impl NewsService {
    pub fn new(config: &NewsConfig, source: Arc<dyn NewsSource>) -> Self {
        let (events, _) = broadcast::channel(REFRESH_EVENT_CAPACITY);
        let inner = Inner {
            source,
            queue: RequestQueue::new(config.min_request_interval(), config.task_timeout()),
            cache: ResponseCache::new(CacheConfig::from(config)),
            titles: TitleRegistry::new(),
            synthesizer: FallbackSynthesizer::new(config.fallback_batch_size),
            throttle: ThrottleGate::new(config.throttle_cooldown(), config.max_cooldown()),
            factory: ItemFactory::new(),
            inflight: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
            refreshes: Mutex::new(HashMap::new()),
            fallback_lock: Mutex::new(()),
            events,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Get the feed for `query`, from cache when possible.
    ///
    /// Never fails: upstream problems are answered with synthetic content.
    pub async fn fetch_feed(&self, query: &FeedQuery) -> Feed {
        let key = query.cache_key();
        match self.inner.cache.lookup(&key, Instant::now()) {
            Lookup::Fresh(items) => items,
            Lookup::Stale { items, revalidate } => {
                if revalidate {
                    self.spawn_refresh(key, query.clone());
                }
                items
            }
            Lookup::Miss => self.load_coalesced(key, query.clone()).await,
        }
    }

    fn load_coalesced(&self, key: String, query: FeedQuery) -> InflightFeed {
        let mut inflight = self.inner.inflight.lock();
        if let Some((_, pending)) = inflight.get(&key) {
            debug!(key = %key, "Joining in-flight request");
            metrics::record_cache_coalesced();
            return pending.clone();
        }

        let generation = self.inner.generation();
        let inner = self.inner.clone();
        let task_key = key.clone();
        let load = async move {
            let feed = inner.load(&task_key, &query).await;
            let mut inflight = inner.inflight.lock();
            if inflight.get(&task_key).is_some_and(|(g, _)| *g == generation) {
                inflight.remove(&task_key);
            }
            feed
        }
        .boxed()
        .shared();

        inflight.insert(key, (generation, load.clone()));
        load
    }

    fn spawn_refresh(&self, key: String, query: FeedQuery) {
        let mut refreshes = self.inner.refreshes.lock();
        if refreshes.get(&key).is_some_and(|h| !h.is_finished()) {
            return;
        }

        debug!(key = %key, "Scheduling background refresh");
        let inner = self.inner.clone();
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let outcome = match inner.fetch_upstream(&query).await.and_then(|payload| {
                inner.accept_upstream(&task_key, &query, payload)
            }) {
                Ok(feed) => RefreshOutcome::Refreshed { items: feed.len() },
                Err(err) => {
                    warn!(key = %task_key, reason = err.reason(), "Background refresh failed, keeping stale feed: {}", err);
                    RefreshOutcome::Failed {
                        reason: err.reason(),
                    }
                }
            };

            metrics::record_background_refresh(outcome.as_str());
            inner.refreshes.lock().remove(&task_key);
            // No subscribers is fine
            let _ = inner.events.send(RefreshEvent {
                key: task_key,
                outcome,
            });
        });
        refreshes.insert(key, handle.abort_handle());
    }

    /// Receive an event for every finished background refresh.
    pub fn subscribe_refresh_events(&self) -> broadcast::Receiver<RefreshEvent> {
        self.inner.events.subscribe()
    }

    /// Headlines for a portal or upstream category label.
    pub async fn top_headlines(&self, label: &str) -> Vec<ContentItem> {
        let label = label.trim().to_uppercase();
        let query = FeedQuery::headlines(Category::from_label(&label), label.clone());
        present(&self.fetch_feed(&query).await, &label, None)
    }

    /// Keyword search, optionally narrowed by a category word.
    pub async fn search_news(&self, query: &str, category: Option<&str>) -> Vec<ContentItem> {
        let query = query.trim();
        if query.is_empty() {
            debug!("Ignoring blank search");
            return Vec::new();
        }

        let category = category.map(str::trim).filter(|c| !c.is_empty());
        let q = match category {
            Some(c) if !c.eq_ignore_ascii_case("all") => format!("{} {}", query, c),
            _ => query.to_string(),
        };
        let label = category.unwrap_or("BUSCA").to_uppercase();
        let feed_query = FeedQuery::search(q, label.clone());
        present(&self.fetch_feed(&feed_query).await, &label, None)
    }

    pub async fn international_news(&self) -> Vec<ContentItem> {
        let query = FeedQuery::headlines(Category::World, "INTERNACIONAL").with_max(20);
        present(&self.fetch_feed(&query).await, &query.label, Some(20))
    }

    pub async fn breaking_news(&self) -> Vec<ContentItem> {
        let query = FeedQuery::headlines(Category::General, "URGENTE").with_max(5);
        present(&self.fetch_feed(&query).await, &query.label, Some(3))
    }

    pub async fn all_news(&self) -> Vec<ContentItem> {
        let query = FeedQuery::headlines(Category::General, "GERAL").with_max(30);
        present(&self.fetch_feed(&query).await, &query.label, None)
    }

    /// Load the feeds the home page opens with.
    pub async fn warm(&self) {
        let all = self.all_news().await.len();
        let breaking = self.breaking_news().await.len();
        let international = self.international_news().await.len();
        info!(all, breaking, international, "News cache warmed");
    }

    /// Empty the cache and forget every surfaced title.
    pub fn clear_cache(&self) {
        self.inner.cache.clear();
        self.inner.titles.clear();
        info!("News cache and title registry cleared");
    }

    pub fn cache_stats(&self) -> CacheReport {
        CacheReport {
            size: self.inner.cache.len(),
            keys: self.inner.cache.keys(),
            used_titles: self.inner.titles.len(),
            pending_requests: self.inner.queue.pending(),
            stats: self.inner.cache.stats(),
        }
    }

    /// Return to a just-started state. Item ids keep increasing.
    ///
    /// Loads already in flight are detached: their callers reload against
    /// the cleared state and nothing they fetched is cached.
    pub fn reset(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.inflight.lock().clear();
        self.abort_refreshes();
        self.clear_cache();
        self.inner.synthesizer.reset();
        self.inner.throttle.reset();
        self.inner.cache.reset_stats();
        info!("News service reset");
    }

    /// Cancel background work. Cached feeds stay available.
    pub fn shutdown(&self) {
        let aborted = self.abort_refreshes();
        info!(aborted, "News service shut down");
    }

    fn abort_refreshes(&self) -> usize {
        let handles: Vec<AbortHandle> = self
            .inner
            .refreshes
            .lock()
            .drain()
            .map(|(_, handle)| handle)
            .collect();
        for handle in &handles {
            handle.abort();
        }
        handles.len()
    }

    /// Remaining upstream cooldown, if the upstream throttled us recently.
    pub fn cooldown_remaining(&self) -> Option<Duration> {
        self.inner.throttle.remaining(Instant::now())
    }

    pub fn pending_requests(&self) -> usize {
        self.inner.queue.pending()
    }

    /// Number of background refreshes still running.
    pub fn active_refreshes(&self) -> usize {
        self.inner
            .refreshes
            .lock()
            .values()
            .filter(|h| !h.is_finished())
            .count()
    }

    /// Number of fallback batches produced since start or the last reset.
    pub fn fallback_activations(&self) -> u64 {
        self.inner.synthesizer.calls()
    }
}

/// Tag items with the caller's display label and apply its item limit.
/// Ids and everything else are kept.
fn present(feed: &Feed, label: &str, limit: Option<usize>) -> Vec<ContentItem> {
    feed.iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|item| {
            let mut item = item.clone();
            item.category = label.to_uppercase();
            item
        })
        .collect()
}

impl Inner {
    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Load a missing key: upstream first, synthetic content on any failure.
    ///
    /// A reset during the upstream call discards its result and starts over.
    async fn load(self: &Arc<Self>, key: &str, query: &FeedQuery) -> Feed {
        loop {
            let generation = self.generation();
            let fetched = self.fetch_upstream(query).await;
            if self.generation() != generation {
                debug!(key, "Service was reset during load, retrying");
                continue;
            }

            return match fetched.and_then(|payload| self.accept_upstream(key, query, payload)) {
                Ok(feed) => feed,
                Err(err) => self.fallback(key, query, &err),
            };
        }
    }

    /// Run one upstream call through the queue, honouring the cooldown.
    async fn fetch_upstream(self: &Arc<Self>, query: &FeedQuery) -> Result<UpstreamPayload, UpstreamError> {
        if let Some(left) = self.throttle.remaining(Instant::now()) {
            return Err(UpstreamError::CoolingDown(left));
        }

        let inner = self.clone();
        let query = query.clone();
        self.queue
            .enqueue(async move { inner.call_source(&query).await })
            .await?
    }

    /// Runs inside the queue. The cooldown is checked again because it may
    /// have started while this task was waiting.
    async fn call_source(&self, query: &FeedQuery) -> Result<UpstreamPayload, UpstreamError> {
        if let Some(left) = self.throttle.remaining(Instant::now()) {
            return Err(UpstreamError::CoolingDown(left));
        }

        let started = std::time::Instant::now();
        let result = self.source.fetch(query).await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(err) => err.reason(),
        };
        metrics::record_upstream_call(query.endpoint.path(), outcome, started.elapsed().as_secs_f64());

        match &result {
            Ok(_) => self.throttle.record_success(),
            Err(UpstreamError::Throttled { retry_after, .. }) => {
                self.throttle.record_throttle(Instant::now(), *retry_after);
            }
            Err(_) => {}
        }
        result
    }

    /// Ingest and cache an upstream payload.
    ///
    /// A payload whose every title was already published elsewhere is
    /// rejected rather than cached as an empty feed.
    fn accept_upstream(&self, key: &str, query: &FeedQuery, payload: UpstreamPayload) -> Result<Feed, UpstreamError> {
        let received = payload.articles.len();
        let feed = self.ingest(key, &query.label, payload.articles, Provenance::Upstream);
        if feed.is_empty() && received > 0 {
            return Err(UpstreamError::Exhausted);
        }
        self.cache.store(key, feed.clone(), Provenance::Upstream, Instant::now());
        debug!(key, items = feed.len(), "Cached upstream feed");
        Ok(feed)
    }

    fn fallback(&self, key: &str, query: &FeedQuery, err: &UpstreamError) -> Feed {
        let reason = err.reason();
        warn!(key, reason, "Upstream unavailable, serving synthetic feed: {}", err);
        metrics::record_fallback(reason);

        let _guard = self.fallback_lock.lock();
        let articles = self.synthesizer.synthesize(
            query.fallback_category(),
            query.query.as_deref(),
            &self.titles,
        );
        let feed = self.ingest(key, &query.label, articles, Provenance::Synthetic);
        self.cache.store(key, feed.clone(), Provenance::Synthetic, Instant::now());
        feed
    }

    /// Turn articles into items, in order.
    ///
    /// Titles this key published before keep their item, even after the
    /// entry was evicted. Any other title must be new to the registry;
    /// repeats are dropped.
    fn ingest(&self, key: &str, label: &str, articles: Vec<RawArticle>, provenance: Provenance) -> Feed {
        let now = Utc::now();
        let mut in_batch = HashSet::new();
        let mut dropped = 0;
        let mut items: Vec<ContentItem> = Vec::with_capacity(articles.len());

        for article in articles {
            if !in_batch.insert(normalize(&article.title)) {
                dropped += 1;
                continue;
            }
            match self.titles.claim(key, &article.title) {
                Some(Claim::Reuse(existing)) => items.push(existing),
                Some(Claim::Fresh) => {
                    let item = self.factory.build(article, label, provenance, now);
                    self.titles.bind(key, &item);
                    items.push(item);
                }
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            debug!(key, dropped, "Dropped duplicate titles");
            metrics::record_dedup_dropped(dropped);
        }
        for (index, item) in items.iter_mut().enumerate() {
            item.is_main = index == 0;
        }
        items.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleSource;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays scripted responses; unavailable once the script runs out.
    #[derive(Default)]
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<UpstreamPayload, UpstreamError>>>,
        calls: AtomicUsize,
        dispatched: Mutex<Vec<Instant>>,
        delay: Duration,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<UpstreamPayload, UpstreamError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                ..Default::default()
            })
        }

        fn slow(script: Vec<Result<UpstreamPayload, UpstreamError>>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                delay,
                ..Default::default()
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NewsSource for ScriptedSource {
        async fn fetch(&self, _query: &FeedQuery) -> Result<UpstreamPayload, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.dispatched.lock().push(Instant::now());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.script
                .lock()
                .pop_front()
                .unwrap_or(Err(UpstreamError::Unavailable))
        }
    }

    fn articles(titles: &[&str]) -> Result<UpstreamPayload, UpstreamError> {
        Ok(UpstreamPayload::new(
            titles
                .iter()
                .map(|t| RawArticle {
                    title: t.to_string(),
                    description: Some(format!("Resumo de {}", t)),
                    url: format!("https://example.com/{}", t),
                    source: ArticleSource {
                        name: "Folha".to_string(),
                        url: String::new(),
                    },
                    ..Default::default()
                })
                .collect(),
        ))
    }

    fn config() -> NewsConfig {
        NewsConfig {
            cache_ttl_seconds: 7200,
            fallback_ttl_seconds: 300,
            revalidate_window_seconds: 900,
            min_request_interval_ms: 3000,
            task_timeout_seconds: 15,
            max_cache_entries: 64,
            fallback_batch_size: 12,
            throttle_cooldown_seconds: 60,
            max_cooldown_seconds: 900,
        }
    }

    fn service(source: Arc<ScriptedSource>) -> NewsService {
        NewsService::new(&config(), source)
    }

    fn titles(items: &[ContentItem]) -> Vec<&str> {
        items.iter().map(|i| i.title.as_str()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_headlines_then_refresh_keeps_identity() {
        let source = ScriptedSource::new(vec![articles(&["A", "B", "C"]), articles(&["A", "B", "D"])]);
        let news = service(source.clone());

        let first = news.top_headlines("technology").await;
        assert_eq!(titles(&first), vec!["A", "B", "C"]);
        assert!(first.iter().all(|i| i.category == "TECHNOLOGY"));
        assert!(first.windows(2).all(|w| w[0].id < w[1].id));
        assert!(first[0].is_main && !first[1].is_main);

        // Fresh: no network
        let again = news.top_headlines("technology").await;
        assert_eq!(again, first);
        assert_eq!(source.calls(), 1);

        // Expire it: the stale feed is served while one refresh runs
        let mut events = news.subscribe_refresh_events();
        tokio::time::advance(Duration::from_secs(7201)).await;
        let stale = news.top_headlines("technology").await;
        assert_eq!(stale, first);

        let event = events.recv().await.unwrap();
        assert_eq!(event.outcome, RefreshOutcome::Refreshed { items: 3 });

        let refreshed = news.top_headlines("technology").await;
        assert_eq!(titles(&refreshed), vec!["A", "B", "D"]);
        assert_eq!(refreshed[0].id, first[0].id);
        assert_eq!(refreshed[1].id, first[1].id);
        assert!(refreshed[2].id > first[2].id);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_titles_are_not_repeated_across_feeds() {
        let source = ScriptedSource::new(vec![articles(&["A", "B"]), articles(&["b ", "C", "c"])]);
        let news = service(source);

        let tech = news.top_headlines("tecnologia").await;
        let sports = news.top_headlines("esportes").await;

        assert_eq!(titles(&tech), vec!["A", "B"]);
        assert_eq!(titles(&sports), vec!["C"]);
        assert!(sports[0].is_main);
        assert_eq!(news.cache_stats().used_titles, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_misses_share_one_call() {
        let source = ScriptedSource::slow(vec![articles(&["A", "B"])], Duration::from_secs(1));
        let news = service(source.clone());

        let calls = (0..5).map(|_| news.top_headlines("geral"));
        let results = futures::future::join_all(calls).await;

        assert_eq!(source.calls(), 1);
        for result in &results {
            assert_eq!(result, &results[0]);
        }
        assert_eq!(results[0].len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_upstream_calls_are_spaced() {
        let source = ScriptedSource::new(vec![articles(&["A"]), articles(&["B"]), articles(&["C"])]);
        let news = service(source.clone());

        tokio::join!(
            news.top_headlines("tecnologia"),
            news.top_headlines("esportes"),
            news.top_headlines("saude"),
        );

        let times = source.dispatched.lock().clone();
        assert_eq!(times.len(), 3);
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(3000));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_falls_back_and_cools_down() {
        let throttled = Err(UpstreamError::Throttled {
            status: 429,
            retry_after: None,
        });
        let source = ScriptedSource::new(vec![articles(&["A"]), throttled]);
        let news = service(source.clone());

        let real = news.top_headlines("geral").await;
        let synthetic = news.top_headlines("tecnologia").await;

        assert!(!synthetic.is_empty());
        assert!(synthetic.iter().all(|i| i.is_synthetic()));
        let mut seen: HashSet<String> = real.iter().map(|i| normalize(&i.title)).collect();
        for item in &synthetic {
            assert!(seen.insert(normalize(&item.title)), "duplicate {}", item.title);
        }
        assert!(news.cooldown_remaining().is_some());

        // During the cooldown the upstream is not called at all
        let cooled = news.top_headlines("esportes").await;
        assert!(cooled.iter().all(|i| i.is_synthetic()));
        assert_eq!(source.calls(), 2);
        assert_eq!(news.fallback_activations(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_failure_kind_is_masked() {
        let failures = vec![
            Err(UpstreamError::Status {
                status: 500,
                body: "boom".into(),
            }),
            Err(UpstreamError::Status {
                status: 404,
                body: "nope".into(),
            }),
            Err(UpstreamError::Timeout),
            Err(UpstreamError::Transport("reset".into())),
            Err(UpstreamError::Malformed("bad".into())),
        ];
        let source = ScriptedSource::new(failures);
        let news = service(source);

        for label in ["geral", "tecnologia", "esportes", "saude", "ciencia"] {
            let items = news.top_headlines(label).await;
            assert!(!items.is_empty(), "{label} came back empty");
            assert!(items.iter().all(|i| i.is_synthetic()));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_upstream_is_masked() {
        let source = ScriptedSource::slow(vec![articles(&["A"])], Duration::from_secs(3600));
        let news = service(source);

        let items = news.all_news().await;
        assert!(!items.is_empty());
        assert!(items.iter().all(|i| i.is_synthetic()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_keeps_stale_feed() {
        let source = ScriptedSource::new(vec![articles(&["A", "B"])]);
        let news = service(source);

        let first = news.all_news().await;
        let mut events = news.subscribe_refresh_events();
        tokio::time::advance(Duration::from_secs(7201)).await;
        assert_eq!(news.all_news().await, first);

        let event = events.recv().await.unwrap();
        assert_eq!(event.outcome, RefreshOutcome::Failed { reason: "unavailable" });
        assert_eq!(news.all_news().await, first);
    }

    #[tokio::test(start_paused = true)]
    async fn test_synthetic_feed_expires_sooner() {
        let source = ScriptedSource::new(vec![Err(UpstreamError::Unavailable), articles(&["Real"])]);
        let news = service(source.clone());

        let synthetic = news.international_news().await;
        assert!(synthetic.iter().all(|i| i.is_synthetic()));
        assert!(synthetic.len() <= 20);

        tokio::time::advance(Duration::from_secs(200)).await;
        assert_eq!(news.international_news().await, synthetic);
        assert_eq!(source.calls(), 1);

        let mut events = news.subscribe_refresh_events();
        tokio::time::advance(Duration::from_secs(101)).await;
        news.international_news().await;
        assert!(matches!(
            events.recv().await.unwrap().outcome,
            RefreshOutcome::Refreshed { items: 1 }
        ));
        assert_eq!(titles(&news.international_news().await), vec!["Real"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_breaking_news_is_capped() {
        let source = ScriptedSource::new(vec![articles(&["A", "B", "C", "D", "E"])]);
        let news = service(source);

        let breaking = news.breaking_news().await;
        assert_eq!(titles(&breaking), vec!["A", "B", "C"]);
        assert!(breaking.iter().all(|i| i.category == "URGENTE"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_builds_query_and_label() {
        let source = ScriptedSource::new(vec![Err(UpstreamError::Unavailable)]);
        let news = service(source);

        let items = news.search_news("eleições", Some("politica")).await;
        assert!(items[0].title.contains("eleições"));
        assert!(items.iter().all(|i| i.category == "POLITICA"));
        assert!(news.search_news("   ", None).await.is_empty());

        let keys = news.cache_stats().keys;
        assert_eq!(keys, vec![r#"search_{"q":"eleições politica"}"#.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cache_forgets_titles() {
        let source = ScriptedSource::new(vec![articles(&["A"]), articles(&["A"])]);
        let news = service(source);

        let first = news.top_headlines("geral").await;
        news.clear_cache();

        let report = news.cache_stats();
        assert_eq!(report.size, 0);
        assert_eq!(report.used_titles, 0);

        let second = news.top_headlines("geral").await;
        assert_eq!(titles(&second), vec!["A"]);
        assert!(second[0].id > first[0].id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_payload_falls_back() {
        let source = ScriptedSource::new(vec![articles(&["A", "B"]), articles(&["A", "B"])]);
        let news = service(source);

        news.top_headlines("geral").await;
        let other = news.top_headlines("tecnologia").await;
        assert!(!other.is_empty());
        assert!(other.iter().all(|i| i.is_synthetic()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_restores_initial_state() {
        let throttled = Err(UpstreamError::Throttled {
            status: 403,
            retry_after: None,
        });
        let source = ScriptedSource::new(vec![throttled, articles(&["A"])]);
        let news = service(source);

        let synthetic = news.all_news().await;
        assert!(news.cooldown_remaining().is_some());

        news.reset();
        assert!(news.cooldown_remaining().is_none());
        assert_eq!(news.fallback_activations(), 0);
        assert_eq!(news.cache_stats().stats.misses, 0);
        assert_eq!(news.active_refreshes(), 0);

        let fresh = news.all_news().await;
        assert_eq!(titles(&fresh), vec!["A"]);
        assert!(fresh[0].id > synthetic.last().unwrap().id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_evicted_feed_gets_its_items_back() {
        let source = ScriptedSource::new(vec![
            articles(&["Tech A", "Tech B"]),
            articles(&["Gol"]),
            articles(&["Tech A", "Tech B"]),
        ]);
        let small = NewsConfig {
            max_cache_entries: 1,
            ..config()
        };
        let news = NewsService::new(&small, source.clone());

        let tech = news.top_headlines("tecnologia").await;
        news.top_headlines("esportes").await;
        assert_eq!(news.cache_stats().size, 1);

        let again = news.top_headlines("tecnologia").await;
        assert_eq!(source.calls(), 3);
        assert!(again.iter().all(|i| !i.is_synthetic()));
        assert_eq!(again, tech);
        assert_eq!(news.fallback_activations(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_discards_inflight_load() {
        let source = ScriptedSource::slow(
            vec![articles(&["Antes"]), articles(&["Depois"])],
            Duration::from_secs(1),
        );
        let news = service(source.clone());

        let pending = tokio::spawn({
            let news = news.clone();
            async move { news.all_news().await }
        });
        // Let the load reach the upstream call
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(source.calls(), 1);
        news.reset();

        let items = pending.await.unwrap();
        assert_eq!(titles(&items), vec!["Depois"]);
        assert_eq!(news.cache_stats().used_titles, 1);
        assert_eq!(titles(&news.all_news().await), vec!["Depois"]);
        assert_eq!(source.calls(), 2);
    }
}
