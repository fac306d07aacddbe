// HTTP request handlers
// Author: kelexine (https://github.com/kelexine)

use super::routes::AppState;
use crate::cache::CacheReport;
use crate::error::{AppError, Result};
use crate::markets::{MarketData, MarketFeed};
use crate::metrics::gather_metrics;
use crate::models::{paginate, ContentItem, Page};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

const DEFAULT_PAGE_SIZE: usize = 12;
const MAX_PAGE_SIZE: usize = 50;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub checks: HashMap<String, HealthCheck>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub message: String,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut checks = HashMap::new();
    let mut overall_status = HealthStatus::Healthy;

    // Upstream: configured and not cooling down
    let upstream_check = if state.config.upstream.api_key().is_none() {
        overall_status = HealthStatus::Degraded;
        HealthCheck {
            status: "warning".to_string(),
            message: "No API key configured, serving synthetic content".to_string(),
        }
    } else if let Some(left) = state.news.cooldown_remaining() {
        overall_status = HealthStatus::Degraded;
        HealthCheck {
            status: "warning".to_string(),
            message: format!("Throttled, cooling down for {} seconds", left.as_secs()),
        }
    } else {
        HealthCheck {
            status: "ok".to_string(),
            message: format!("API base: {}", state.config.upstream.base_url),
        }
    };
    checks.insert("upstream".to_string(), upstream_check);

    let report = state.news.cache_stats();
    checks.insert(
        "news_cache".to_string(),
        HealthCheck {
            status: "ok".to_string(),
            message: format!("{} feeds, {} titles", report.size, report.used_titles),
        },
    );
    checks.insert(
        "request_queue".to_string(),
        HealthCheck {
            status: "ok".to_string(),
            message: format!("{} pending", report.pending_requests),
        },
    );

    Json(HealthResponse {
        status: overall_status,
        checks,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        gather_metrics(),
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct NewsParams {
    pub category: Option<String>,
    pub q: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// `/api/news`: a query searches, a category other than `all` lists its
/// headlines, anything else lists the general feed.
pub async fn news_handler(
    State(state): State<AppState>,
    Query(params): Query<NewsParams>,
) -> Json<Page<ContentItem>> {
    let category = params
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let query = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let items = match (query, category) {
        (Some(q), category) => state.news.search_news(q, category).await,
        (None, Some(c)) if !c.eq_ignore_ascii_case("all") => state.news.top_headlines(c).await,
        _ => state.news.all_news().await,
    };

    let page_size = params
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let page = paginate(&items, params.page.unwrap_or(1), page_size);
    debug!(total = page.total, page = page.page, "Serving news page");
    Json(page)
}

pub async fn breaking_handler(State(state): State<AppState>) -> Json<Vec<ContentItem>> {
    Json(state.news.breaking_news().await)
}

pub async fn international_handler(State(state): State<AppState>) -> Json<Vec<ContentItem>> {
    Json(state.news.international_news().await)
}

#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    pub news: CacheReport,
    pub market_feeds: usize,
}

pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse {
        news: state.news.cache_stats(),
        market_feeds: state.markets.cached_feeds(),
    })
}

pub async fn clear_cache_handler(State(state): State<AppState>) -> StatusCode {
    state.news.clear_cache();
    state.markets.clear_cache();
    info!("Caches cleared via API");
    StatusCode::NO_CONTENT
}

pub async fn markets_handler(
    State(state): State<AppState>,
    Path(feed): Path<String>,
) -> Result<Json<MarketData>> {
    let feed = MarketFeed::from_name(&feed)
        .ok_or_else(|| AppError::NotFound(format!("unknown market feed '{}'", feed)))?;
    Ok(Json(state.markets.feed(feed)))
}
