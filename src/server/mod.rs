//! Axum-based HTTP surface for headline-cache.
//!
//! Exposes the news and market operations as JSON so the portal UI can
//! consume them over HTTP.
//!
//! # Components
//!
//! - `handlers`: Implementation of individual endpoints (news, markets, cache, health, metrics).
//! - `middleware`: Request ID tracking.
//! - `routes`: The main router configuration that ties everything together.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod handlers;
mod middleware;
mod routes;

pub use handlers::{CacheStatsResponse, HealthResponse, HealthStatus};
pub use routes::{create_router, AppState};
