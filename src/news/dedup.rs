// Title registry for cross-request deduplication
// Author: kelexine (https://github.com/kelexine)

use crate::models::ContentItem;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// Dedup key for a title: trimmed and lowercased.
pub fn normalize(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Outcome of [`TitleRegistry::claim`].
#[derive(Debug, Clone, PartialEq)]
pub enum Claim {
    /// First sighting; the title now belongs to the claiming key.
    Fresh,
    /// The key already published this title; reuse its item.
    Reuse(ContentItem),
}

#[derive(Debug, Default)]
struct Holder {
    owner: Option<String>,
    item: Option<ContentItem>,
}

/// Normalized titles already surfaced by this service instance, with the
/// cache key that published each one and its item.
///
/// Ownership outlives cache entries, so an evicted feed gets its own items
/// back on the next load. Only grows; [`TitleRegistry::clear`] is the only
/// way to forget a title.
#[derive(Debug, Default)]
pub struct TitleRegistry {
    titles: RwLock<HashMap<String, Holder>>,
}

impl TitleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, title: &str) -> bool {
        self.titles.read().contains_key(&normalize(title))
    }

    /// Record `title` without an owner and report whether it was unseen.
    /// Blank titles are never admitted.
    pub fn admit(&self, title: &str) -> bool {
        let norm = normalize(title);
        if norm.is_empty() {
            return false;
        }
        let mut titles = self.titles.write();
        if titles.contains_key(&norm) {
            return false;
        }
        titles.insert(norm, Holder::default());
        true
    }

    /// Claim `title` for cache key `key`.
    ///
    /// `None` when the title is blank or belongs to another key. A title
    /// claimed by `key` but not yet bound to an item is also `None`.
    pub fn claim(&self, key: &str, title: &str) -> Option<Claim> {
        let norm = normalize(title);
        if norm.is_empty() {
            return None;
        }
        let mut titles = self.titles.write();
        match titles.get(&norm) {
            None => {
                titles.insert(
                    norm,
                    Holder {
                        owner: Some(key.to_string()),
                        item: None,
                    },
                );
                Some(Claim::Fresh)
            }
            Some(Holder {
                owner: Some(owner),
                item: Some(item),
            }) if owner == key => Some(Claim::Reuse(item.clone())),
            Some(_) => None,
        }
    }

    /// Attach the published item to a title `key` owns.
    pub fn bind(&self, key: &str, item: &ContentItem) {
        let mut titles = self.titles.write();
        if let Some(holder) = titles.get_mut(&normalize(&item.title)) {
            if holder.owner.as_deref() == Some(key) {
                holder.item = Some(item.clone());
            }
        }
    }

    /// Keep the items whose titles are unseen, in their original order,
    /// and record those titles. Later duplicates inside `batch` are dropped
    /// too.
    pub fn filter_new<T, F>(&self, batch: Vec<T>, title_of: F) -> Vec<T>
    where
        F: Fn(&T) -> &str,
    {
        let before = batch.len();
        let kept: Vec<T> = batch
            .into_iter()
            .filter(|item| self.admit(title_of(item)))
            .collect();
        if kept.len() < before {
            debug!("Dropped {} duplicate titles", before - kept.len());
        }
        kept
    }

    pub fn len(&self) -> usize {
        self.titles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.titles.write().clear();
    }
}
