use std::sync::Arc;

use tracing::debug;

use crate::deleted::read_string_set;
use crate::store::{save_json, Store};

/// Article ids starred with "save for later".
pub struct SavedRegistry<S> {
    store: Arc<S>,
    key: String,
    ids: Vec<String>,
}

impl<S: Store> SavedRegistry<S> {
    pub async fn load(store: Arc<S>, key: &str) -> Self {
        let ids = read_string_set(store.as_ref(), key).await;
        Self {
            store,
            key: key.to_string(),
            ids,
        }
    }

    /// Flip the saved state of `id`; returns true when it is now saved.
    pub async fn toggle(&mut self, id: &str) -> bool {
        let mut ids = read_string_set(self.store.as_ref(), &self.key).await;
        let saved = match ids.iter().position(|s| s == id) {
            Some(index) => {
                ids.remove(index);
                false
            }
            None => {
                ids.push(id.to_string());
                true
            }
        };
        save_json(self.store.as_ref(), &self.key, &ids).await;
        self.ids = ids;
        debug!("Article {} saved={}", id, saved);
        saved
    }

    pub fn is_saved(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    pub fn list(&self) -> &[String] {
        &self.ids
    }

    pub fn count(&self) -> usize {
        self.ids.len()
    }
}
