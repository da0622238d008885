use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::store::{load_text, save_json, Store};

pub const DEFAULT_CATEGORY: &str = "General";

/// A user-added news source. Recorded locally only; nothing fetches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    pub id: i64,
    pub name: String,
    pub url: String,
    #[serde(default = "default_category")]
    pub category: String,
    pub date_added: DateTime<Utc>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_enabled() -> bool {
    true
}

/// Blank or missing categories collapse to [`DEFAULT_CATEGORY`].
pub fn normalize_category(category: Option<&str>) -> String {
    match category.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => default_category(),
    }
}

/// Decode a persisted feed collection.
///
/// Total: anything that is not a JSON array decodes to an empty collection,
/// and array elements that are not complete, valid records are dropped.
/// Records repeating an earlier `id` are dropped too.
pub fn decode_feeds(text: &str) -> Vec<FeedEntry> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(text) {
        Ok(values) => values,
        Err(e) => {
            warn!("Discarding unreadable feed collection: {}", e);
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut feeds = Vec::with_capacity(values.len());
    for value in values {
        let mut entry: FeedEntry = match serde_json::from_value(value) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Dropping malformed feed record: {}", e);
                continue;
            }
        };
        if entry.name.trim().is_empty() || entry.url.trim().is_empty() {
            warn!("Dropping feed record {} with empty name or url", entry.id);
            continue;
        }
        if !seen.insert(entry.id) {
            warn!("Dropping feed record with duplicate id {}", entry.id);
            continue;
        }
        entry.category = normalize_category(Some(&entry.category));
        feeds.push(entry);
    }
    feeds
}

/// Pick an id based on the creation time that no entry uses yet.
fn next_id(feeds: &[FeedEntry], now: DateTime<Utc>) -> i64 {
    let stamp = now.timestamp_millis();
    let Some(max) = feeds.iter().map(|f| f.id).max() else {
        return stamp;
    };
    if stamp > max {
        return stamp;
    }
    match max.checked_add(1) {
        Some(id) => id,
        None => {
            let used: HashSet<i64> = feeds.iter().map(|f| f.id).collect();
            (1..).find(|id| !used.contains(id)).unwrap_or(0)
        }
    }
}

/// Ordered registry of custom feeds backed by a [`Store`].
///
/// Every mutation reloads the collection from the store, applies the change
/// and writes the whole collection back.
pub struct FeedRegistry<S> {
    store: Arc<S>,
    key: String,
    feeds: Vec<FeedEntry>,
}

impl<S: Store> FeedRegistry<S> {
    pub async fn load(store: Arc<S>, key: &str) -> Self {
        let feeds = read(store.as_ref(), key).await;
        Self {
            store,
            key: key.to_string(),
            feeds,
        }
    }

    /// Append a new enabled entry. Callers validate `name` and `url` first.
    pub async fn add(&mut self, name: &str, url: &str, category: Option<&str>) -> FeedEntry {
        let mut feeds = read(self.store.as_ref(), &self.key).await;
        let now = Utc::now();
        let entry = FeedEntry {
            id: next_id(&feeds, now),
            name: name.to_string(),
            url: url.to_string(),
            category: normalize_category(category),
            date_added: now,
            enabled: true,
        };
        feeds.push(entry.clone());
        self.commit(feeds).await;
        info!("Added custom feed '{}' ({})", entry.name, entry.url);
        entry
    }

    /// Drop every entry with `id`. Absent ids are not an error.
    pub async fn remove(&mut self, id: i64) -> &[FeedEntry] {
        let mut feeds = read(self.store.as_ref(), &self.key).await;
        let before = feeds.len();
        feeds.retain(|f| f.id != id);
        if feeds.len() != before {
            info!("Removed custom feed {}", id);
        }
        self.commit(feeds).await;
        &self.feeds
    }

    pub async fn toggle(&mut self, id: i64) -> &[FeedEntry] {
        let mut feeds = read(self.store.as_ref(), &self.key).await;
        if let Some(entry) = feeds.iter_mut().find(|f| f.id == id) {
            entry.enabled = !entry.enabled;
            info!("Custom feed {} enabled={}", id, entry.enabled);
        }
        self.commit(feeds).await;
        &self.feeds
    }

    pub fn list(&self) -> &[FeedEntry] {
        &self.feeds
    }

    pub fn get(&self, id: i64) -> Option<&FeedEntry> {
        self.feeds.iter().find(|f| f.id == id)
    }

    pub fn count(&self) -> usize {
        self.feeds.len()
    }

    pub fn enabled_count(&self) -> usize {
        self.feeds.iter().filter(|f| f.enabled).count()
    }

    async fn commit(&mut self, feeds: Vec<FeedEntry>) {
        save_json(self.store.as_ref(), &self.key, &feeds).await;
        self.feeds = feeds;
    }
}

async fn read<S: Store>(store: &S, key: &str) -> Vec<FeedEntry> {
    load_text(store, key)
        .await
        .map(|text| decode_feeds(&text))
        .unwrap_or_default()
}
