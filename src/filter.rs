use std::sync::Arc;

use tracing::debug;

use crate::store::{load_text, save_text, Store};

/// Slug that matches every category.
pub const ALL_CATEGORIES: &str = "__all";

/// Lowercase, collapse every run outside `[a-z0-9]` into `-`, trim dashes.
/// Empty input becomes `general`.
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut pending_dash = false;
    for c in label.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "general".to_string()
    } else {
        slug
    }
}

/// Persisted category chip selection. Stored as plain text, not JSON.
pub struct CategoryFilter<S> {
    store: Arc<S>,
    key: String,
    active: String,
}

impl<S: Store> CategoryFilter<S> {
    pub async fn load(store: Arc<S>, key: &str) -> Self {
        let active = match load_text(store.as_ref(), key).await {
            Some(slug) if !slug.trim().is_empty() => slug,
            _ => ALL_CATEGORIES.to_string(),
        };
        Self {
            store,
            key: key.to_string(),
            active,
        }
    }

    pub fn active(&self) -> &str {
        &self.active
    }

    pub async fn select(&mut self, slug: &str) {
        let slug = match slug.trim() {
            "" => ALL_CATEGORIES,
            s => s,
        };
        save_text(self.store.as_ref(), &self.key, slug).await;
        self.active = slug.to_string();
        debug!("Active category '{}'", self.active);
    }

    /// Whether an article in `category` stays visible under the selection.
    pub fn shows(&self, category: &str) -> bool {
        category_visible(&self.active, category)
    }
}

pub fn category_visible(active: &str, category: &str) -> bool {
    active == ALL_CATEGORIES || slugify(category) == active
}
