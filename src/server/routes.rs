// HTTP routes configuration
// Author: kelexine (https://github.com/kelexine)

use super::handlers::{
    breaking_handler, cache_stats_handler, clear_cache_handler, health_handler,
    international_handler, markets_handler, metrics_handler, news_handler,
};
use super::middleware;
use crate::config::AppConfig;
use crate::markets::MarketService;
use crate::news::NewsService;
use axum::{routing::get, Router};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub news: NewsService,
    pub markets: Arc<MarketService>,
}

pub fn create_router(config: AppConfig, news: NewsService, markets: MarketService) -> Router {
    let state = AppState {
        config: Arc::new(config),
        news,
        markets: Arc::new(markets),
    };

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/news", get(news_handler))
        .route("/api/news/breaking", get(breaking_handler))
        .route("/api/news/international", get(international_handler))
        .route("/api/cache", get(cache_stats_handler).delete(clear_cache_handler))
        .route("/api/markets/:feed", get(markets_handler));

    middleware::apply(app).with_state(state)
}
