// Domain models for headline-cache
// Author: kelexine (https://github.com/kelexine)

pub mod article;
pub mod category;
pub mod market;
pub mod query;
pub mod upstream;

pub use article::{paginate, relative_age, ContentItem, ItemStatus, Page, Provenance};
pub use category::Category;
pub use market::{CryptoQuote, CurrencyRate, StockQuote, TrendingTopic};
pub use query::{Endpoint, FeedQuery};
pub use upstream::{ArticleSource, RawArticle, UpstreamPayload};
