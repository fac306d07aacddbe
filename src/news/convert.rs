// Article to ContentItem conversion
// Author: kelexine (https://github.com/kelexine)

use crate::models::{ContentItem, ItemStatus, Provenance, RawArticle};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Image used when an article carries none.
pub const DEFAULT_IMAGE: &str =
    "https://images.pexels.com/photos/6193518/pexels-photo-6193518.jpeg?auto=compress&cs=tinysrgb&w=800";

const SUMMARY_CHARS: usize = 200;

/// Summary shown on cards: the description, or the start of the body.
pub fn summarize(description: Option<&str>, content: Option<&str>) -> String {
    if let Some(description) = description.filter(|d| !d.trim().is_empty()) {
        return description.to_string();
    }
    match content.filter(|c| !c.trim().is_empty()) {
        Some(content) => {
            let head: String = content.chars().take(SUMMARY_CHARS).collect();
            format!("{}...", head)
        }
        None => String::new(),
    }
}

/// Builds [`ContentItem`]s and hands out their ids.
///
/// Ids start at 1 and only ever increase, even across cache resets.
#[derive(Debug)]
pub struct ItemFactory {
    next_id: AtomicU64,
}

impl Default for ItemFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemFactory {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of items built so far.
    pub fn issued(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst) - 1
    }

    pub fn build(
        &self,
        article: RawArticle,
        label: &str,
        provenance: Provenance,
        now: DateTime<Utc>,
    ) -> ContentItem {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let published_at = article.published().unwrap_or(now);
        let summary = summarize(article.description.as_deref(), article.content.as_deref());
        let image_url = article
            .image
            .filter(|i| !i.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE.to_string());

        ContentItem {
            id,
            title: article.title,
            summary,
            content: article.content.filter(|c| !c.trim().is_empty()),
            image_url,
            category: label.to_uppercase(),
            published_at,
            source: article.source.name,
            url: article.url,
            views: rand::rng().random_range(100..5100),
            status: ItemStatus::Published,
            is_main: false,
            provenance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleSource;

    fn article(title: &str) -> RawArticle {
        RawArticle {
            title: title.to_string(),
            url: "https://example.com".to_string(),
            source: ArticleSource {
                name: "Folha".to_string(),
                url: String::new(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_summary_prefers_description() {
        assert_eq!(summarize(Some("Resumo"), Some("Corpo")), "Resumo");
    }

    #[test]
    fn test_summary_truncates_content() {
        let body = "x".repeat(500);
        let summary = summarize(Some("  "), Some(&body));
        assert_eq!(summary.chars().count(), SUMMARY_CHARS + 3);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn test_summary_is_char_safe() {
        let body = "ç".repeat(300);
        let summary = summarize(None, Some(&body));
        assert!(summary.starts_with("çç"));
        assert!(summarize(None, None).is_empty());
    }

    #[test]
    fn test_build_fills_defaults() {
        let factory = ItemFactory::new();
        let now = Utc::now();
        let item = factory.build(article("Manchete"), "tecnologia", Provenance::Upstream, now);

        assert_eq!(item.id, 1);
        assert_eq!(item.category, "TECNOLOGIA");
        assert_eq!(item.image_url, DEFAULT_IMAGE);
        assert_eq!(item.published_at, now);
        assert_eq!(item.source, "Folha");
        assert!((100..5100).contains(&item.views));
        assert_eq!(item.status, ItemStatus::Published);
    }

    #[test]
    fn test_ids_increase() {
        let factory = ItemFactory::new();
        let now = Utc::now();
        let ids: Vec<u64> = ["A", "B", "C"]
            .iter()
            .map(|t| factory.build(article(t), "geral", Provenance::Synthetic, now).id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(factory.issued(), 3);
    }
}
