// Market and trend widget feeds
// Author: kelexine (https://github.com/kelexine)

mod baselines;
mod service;

pub use service::{MarketData, MarketFeed, MarketService};
