use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::store::{load_text, save_json, Store};

/// Decode a persisted list of strings, dropping non-strings and repeats.
/// Text that is not a JSON array decodes to an empty list.
pub(crate) fn decode_string_set(text: &str) -> Vec<String> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(text) {
        Ok(values) => values,
        Err(e) => {
            warn!("Discarding unreadable string collection: {}", e);
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter_map(|value| match value {
            serde_json::Value::String(s) => Some(s),
            other => {
                warn!("Dropping non-string entry {}", other);
                None
            }
        })
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

pub(crate) async fn read_string_set<S: Store>(store: &S, key: &str) -> Vec<String> {
    load_text(store, key)
        .await
        .map(|text| decode_string_set(&text))
        .unwrap_or_default()
}

/// URLs of articles the user has hidden.
pub struct DeletionRegistry<S> {
    store: Arc<S>,
    key: String,
    urls: Vec<String>,
}

impl<S: Store> DeletionRegistry<S> {
    pub async fn load(store: Arc<S>, key: &str) -> Self {
        let urls = read_string_set(store.as_ref(), key).await;
        Self {
            store,
            key: key.to_string(),
            urls,
        }
    }

    /// Returns whether the set changed. Already-deleted URLs are left alone
    /// and nothing is written.
    pub async fn mark_deleted(&mut self, url: &str) -> bool {
        let mut urls = read_string_set(self.store.as_ref(), &self.key).await;
        if urls.iter().any(|u| u == url) {
            self.urls = urls;
            return false;
        }
        urls.push(url.to_string());
        self.commit(urls).await;
        info!("Deleted article {}", url);
        true
    }

    /// Returns whether the set changed.
    pub async fn restore(&mut self, url: &str) -> bool {
        let mut urls = read_string_set(self.store.as_ref(), &self.key).await;
        let before = urls.len();
        urls.retain(|u| u != url);
        let changed = urls.len() != before;
        self.commit(urls).await;
        if changed {
            info!("Restored article {}", url);
        }
        changed
    }

    pub fn is_deleted(&self, url: &str) -> bool {
        self.urls.iter().any(|u| u == url)
    }

    pub async fn clear_all(&mut self) {
        let cleared = self.urls.len();
        self.commit(Vec::new()).await;
        info!("Cleared {} deleted articles", cleared);
    }

    pub fn list(&self) -> &[String] {
        &self.urls
    }

    pub fn count(&self) -> usize {
        self.urls.len()
    }

    async fn commit(&mut self, urls: Vec<String>) {
        save_json(self.store.as_ref(), &self.key, &urls).await;
        self.urls = urls;
    }
}
