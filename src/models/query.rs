// Feed queries and their cache keys
// Author: kelexine (https://github.com/kelexine)

use super::category::Category;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Upstream endpoint a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Endpoint {
    TopHeadlines,
    Search,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::TopHeadlines => "top-headlines",
            Endpoint::Search => "search",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// One logical request for a feed.
///
/// `label` is how items are tagged for display and never reaches the
/// upstream, so it is excluded from the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedQuery {
    pub endpoint: Endpoint,
    pub category: Option<Category>,
    pub query: Option<String>,
    pub max: Option<u32>,
    pub label: String,
}

impl FeedQuery {
    pub fn headlines(category: Category, label: impl Into<String>) -> Self {
        Self {
            endpoint: Endpoint::TopHeadlines,
            category: Some(category),
            query: None,
            max: None,
            label: label.into(),
        }
    }

    pub fn search(query: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            endpoint: Endpoint::Search,
            category: None,
            query: Some(query.into()),
            max: None,
            label: label.into(),
        }
    }

    pub fn with_max(mut self, max: u32) -> Self {
        self.max = Some(max);
        self
    }

    /// Category used for fallback templates; searches use the general bank.
    pub fn fallback_category(&self) -> Category {
        self.category.unwrap_or(Category::General)
    }

    /// Query-string parameters that shape the upstream response.
    pub fn params(&self) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        if let Some(category) = self.category {
            params.insert("category", category.as_str().to_string());
        }
        if let Some(q) = &self.query {
            params.insert("q", q.clone());
        }
        if let Some(max) = self.max {
            params.insert("max", max.to_string());
        }
        params
    }

    /// Deterministic key: endpoint plus every response-affecting parameter.
    pub fn cache_key(&self) -> String {
        let params = serde_json::to_string(&self.params()).unwrap_or_default();
        format!("{}_{}", self.endpoint.path(), params)
    }
}
