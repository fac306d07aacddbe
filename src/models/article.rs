//! Normalized article records handed to callers.
//!
//! A [`ContentItem`] is built once, when an upstream or synthetic article
//! enters the cache, and is never mutated afterwards. Callers receive
//! shared slices of these items.

// Author: kelexine (https://github.com/kelexine)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where an item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Parsed from a successful upstream response.
    Upstream,
    /// Generated by the fallback synthesizer.
    Synthetic,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Upstream => "upstream",
            Provenance::Synthetic => "synthetic",
        }
    }
}

/// Editorial lifecycle status. Display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Published,
    Draft,
    Archived,
}

/// A normalized article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    /// Unique within a service instance, assigned in increasing order.
    pub id: u64,
    pub title: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub image_url: String,
    /// Display category, upper-cased.
    pub category: String,
    pub published_at: DateTime<Utc>,
    /// Outlet name.
    pub source: String,
    pub url: String,
    pub views: u32,
    pub status: ItemStatus,
    pub is_main: bool,
    pub provenance: Provenance,
}

impl ContentItem {
    pub fn is_synthetic(&self) -> bool {
        self.provenance == Provenance::Synthetic
    }

    /// Relative publication age as shown on news cards (pt-BR).
    pub fn relative_age(&self, now: DateTime<Utc>) -> String {
        relative_age(self.published_at, now)
    }
}

/// Render the distance between `published` and `now` the way the portal
/// labels cards: "agora mesmo", "há 5 minutos", "há 1 hora", "há 3 dias".
pub fn relative_age(published: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - published).num_minutes();
    if minutes < 1 {
        return "agora mesmo".to_string();
    }
    if minutes < 60 {
        return plural(minutes, "minuto");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return plural(hours, "hora");
    }
    plural(hours / 24, "dia")
}

fn plural(n: i64, unit: &str) -> String {
    if n > 1 {
        format!("há {} {}s", n, unit)
    } else {
        format!("há {} {}", n, unit)
    }
}

/// Paged view over a feed, as the portal's infinite scroll consumes it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub has_more: bool,
}

/// Slice `items` into 1-based pages. Page 0 is treated as page 1 and a
/// zero page size as a single page holding everything.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let page_size = if page_size == 0 { items.len().max(1) } else { page_size };
    let start = (page - 1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());

    Page {
        items: items[start..end].to_vec(),
        page,
        page_size,
        total: items.len(),
        has_more: end < items.len(),
    }
}
