// News feeds: cache, dedup and fallback
// Author: kelexine (https://github.com/kelexine)

pub mod convert;
pub mod dedup;
pub mod fallback;
mod service;

pub use dedup::{normalize, Claim, TitleRegistry};
pub use fallback::FallbackSynthesizer;
pub use service::{NewsService, RefreshEvent, RefreshOutcome};
