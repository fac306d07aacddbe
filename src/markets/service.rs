// Market widget data source with a short-lived per-feed cache
// Author: kelexine (https://github.com/kelexine)

use super::baselines::{Baseline, CRYPTOS, CURRENCIES, INDICES, STOCKS, TRENDS};
use crate::config::MarketsConfig;
use crate::metrics;
use crate::models::{CryptoQuote, CurrencyRate, StockQuote, TrendingTopic};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

const TRENDS_SHOWN: usize = 10;

/// One widget feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketFeed {
    Stocks,
    Crypto,
    Currencies,
    Trends,
    Indices,
}

impl MarketFeed {
    pub const ALL: [MarketFeed; 5] = [
        MarketFeed::Stocks,
        MarketFeed::Crypto,
        MarketFeed::Currencies,
        MarketFeed::Trends,
        MarketFeed::Indices,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketFeed::Stocks => "stocks",
            MarketFeed::Crypto => "crypto",
            MarketFeed::Currencies => "currencies",
            MarketFeed::Trends => "trends",
            MarketFeed::Indices => "indices",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|feed| feed.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for MarketFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contents of one feed, serialized as a bare JSON array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MarketData {
    Quotes(Vec<StockQuote>),
    Crypto(Vec<CryptoQuote>),
    Currencies(Vec<CurrencyRate>),
    Trends(Vec<TrendingTopic>),
}

impl MarketData {
    pub fn len(&self) -> usize {
        match self {
            MarketData::Quotes(v) => v.len(),
            MarketData::Crypto(v) => v.len(),
            MarketData::Currencies(v) => v.len(),
            MarketData::Trends(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn round(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

type Slot<T> = Option<(Instant, Vec<T>)>;

#[derive(Default)]
struct FeedCache {
    stocks: Slot<StockQuote>,
    indices: Slot<StockQuote>,
    crypto: Slot<CryptoQuote>,
    currencies: Slot<CurrencyRate>,
    trends: Slot<TrendingTopic>,
}

impl FeedCache {
    fn len(&self) -> usize {
        [
            self.stocks.is_some(),
            self.indices.is_some(),
            self.crypto.is_some(),
            self.currencies.is_some(),
            self.trends.is_some(),
        ]
        .into_iter()
        .filter(|cached| *cached)
        .count()
    }
}

/// Simulated market data. Each feed is regenerated at most once per TTL.
pub struct MarketService {
    ttl: Duration,
    rng: Mutex<StdRng>,
    cache: Mutex<FeedCache>,
}

impl MarketService {
    pub fn new(config: &MarketsConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Deterministic variant for tests.
    pub fn with_seed(config: &MarketsConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &MarketsConfig, rng: StdRng) -> Self {
        Self {
            ttl: Duration::from_secs(config.cache_ttl_seconds),
            rng: Mutex::new(rng),
            cache: Mutex::new(FeedCache::default()),
        }
    }

    /// Cached data for `feed`, regenerated once the TTL has passed.
    pub fn feed(&self, feed: MarketFeed) -> MarketData {
        match feed {
            MarketFeed::Stocks => MarketData::Quotes(self.brazilian_stocks()),
            MarketFeed::Indices => MarketData::Quotes(self.market_indices()),
            MarketFeed::Crypto => MarketData::Crypto(self.crypto()),
            MarketFeed::Currencies => MarketData::Currencies(self.currencies()),
            MarketFeed::Trends => MarketData::Trends(self.trends()),
        }
    }

    pub fn brazilian_stocks(&self) -> Vec<StockQuote> {
        self.cached(MarketFeed::Stocks, |c| &mut c.stocks, generate_stocks)
    }

    pub fn crypto(&self) -> Vec<CryptoQuote> {
        self.cached(MarketFeed::Crypto, |c| &mut c.crypto, generate_crypto)
    }

    pub fn currencies(&self) -> Vec<CurrencyRate> {
        self.cached(MarketFeed::Currencies, |c| &mut c.currencies, generate_currencies)
    }

    pub fn trends(&self) -> Vec<TrendingTopic> {
        self.cached(MarketFeed::Trends, |c| &mut c.trends, generate_trends)
    }

    pub fn market_indices(&self) -> Vec<StockQuote> {
        self.cached(MarketFeed::Indices, |c| &mut c.indices, generate_indices)
    }

    pub fn clear_cache(&self) {
        *self.cache.lock() = FeedCache::default();
        debug!("Market cache cleared");
    }

    pub fn cached_feeds(&self) -> usize {
        self.cache.lock().len()
    }

    fn cached<T: Clone>(
        &self,
        feed: MarketFeed,
        slot: impl FnOnce(&mut FeedCache) -> &mut Slot<T>,
        generate: impl FnOnce(&mut StdRng) -> Vec<T>,
    ) -> Vec<T> {
        let now = Instant::now();
        let mut cache = self.cache.lock();
        let slot = slot(&mut *cache);
        if let Some((stored_at, data)) = slot.as_ref() {
            if now.saturating_duration_since(*stored_at) < self.ttl {
                metrics::record_market_cache(feed.as_str(), true);
                return data.clone();
            }
        }

        let data = generate(&mut *self.rng.lock());
        debug!(feed = feed.as_str(), entries = data.len(), "Generated market feed");
        metrics::record_market_cache(feed.as_str(), false);
        *slot = Some((now, data.clone()));
        data
    }
}

fn generate_stocks(rng: &mut StdRng) -> Vec<StockQuote> {
    STOCKS
        .iter()
        .map(|base| {
            let mut quote = quote(rng, base, 0.10, 2);
            quote.volume = rng.random_range(1_000_000..11_000_000);
            quote.market_cap = Some(format!("R$ {:.1}B", rng.random_range(10.0..110.0)));
            quote
        })
        .collect()
}

fn generate_indices(rng: &mut StdRng) -> Vec<StockQuote> {
    INDICES
        .iter()
        .map(|base| {
            let mut quote = quote(rng, base, 0.08, 0);
            quote.volume = rng.random_range(100_000_000..1_100_000_000);
            quote
        })
        .collect()
}

fn generate_crypto(rng: &mut StdRng) -> Vec<CryptoQuote> {
    CRYPTOS
        .iter()
        .map(|base| {
            let (price, change, percent) = vary(rng, base.price, 0.15);
            let decimals = if base.symbol == "BTC" { 0 } else { 2 };
            CryptoQuote {
                symbol: base.symbol.to_string(),
                name: base.name.to_string(),
                price: round(price, decimals),
                change_24h: round(change, 2),
                change_percent_24h: round(percent, 2),
                market_cap: rng.random_range(10_000_000_000..510_000_000_000),
                volume_24h: rng.random_range(1_000_000_000..51_000_000_000),
            }
        })
        .collect()
}

fn generate_currencies(rng: &mut StdRng) -> Vec<CurrencyRate> {
    CURRENCIES
        .iter()
        .map(|base| {
            let (rate, change, percent) = vary(rng, base.price, 0.05);
            CurrencyRate {
                pair: base.symbol.to_string(),
                rate: round(rate, 4),
                change: round(change, 4),
                change_percent: round(percent, 2),
            }
        })
        .collect()
}

fn generate_trends(rng: &mut StdRng) -> Vec<TrendingTopic> {
    let mut templates: Vec<_> = TRENDS.iter().collect();
    templates.shuffle(rng);
    templates
        .into_iter()
        .take(TRENDS_SHOWN)
        .map(|t| TrendingTopic {
            name: t.name.to_string(),
            volume: rng.random_range(10_000..510_000),
            category: t.category.to_string(),
            description: Some(t.description.to_string()),
        })
        .collect()
}

/// Apply a uniform variation of `spread` (total width, so 0.10 is ±5 %)
/// to `base`. Returns the new value, the absolute and the percent change.
fn vary(rng: &mut StdRng, base: f64, spread: f64) -> (f64, f64, f64) {
    let variation = (rng.random::<f64>() - 0.5) * spread;
    let value = base * (1.0 + variation);
    let change = value - base;
    (value, change, change / base * 100.0)
}

fn quote(rng: &mut StdRng, base: &Baseline, spread: f64, decimals: i32) -> StockQuote {
    let (price, change, percent) = vary(rng, base.price, spread);
    StockQuote {
        symbol: base.symbol.to_string(),
        name: base.name.to_string(),
        price: round(price, decimals),
        change: round(change, decimals),
        change_percent: round(percent, 2),
        volume: 0,
        market_cap: None,
    }
}
