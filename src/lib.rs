// headline-cache - rate-limited news cache with synthetic fallback
// Author: kelexine (https://github.com/kelexine)

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod markets;
pub mod metrics;
pub mod models;
pub mod news;
pub mod server;
pub mod upstream;
pub mod utils;
