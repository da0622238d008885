use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use chrono::Utc;
use serde::Serialize;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[from] sqlx::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable string key-value storage.
///
/// Writes must be complete once the returned future resolves, so that a
/// reload right after a mutation observes the new value.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Keys of the persisted collections, all under one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub feeds: String,
    pub deleted: String,
    pub saved: String,
    pub active_category: String,
}

impl StorageKeys {
    pub fn new(namespace: &str) -> Self {
        Self {
            feeds: format!("{}_custom_feeds", namespace),
            deleted: format!("{}_deleted_articles", namespace),
            saved: format!("{}_saved_ids", namespace),
            active_category: format!("{}_active_cat", namespace),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::new("snd")
    }
}

/// Read the raw text under `key`. Never fails: backend errors are logged
/// and reported as a missing value.
pub async fn load_text<S: Store>(store: &S, key: &str) -> Option<String> {
    match store.get(key).await {
        Ok(Some(text)) => Some(text),
        Ok(None) => {
            debug!("No stored value for '{}'", key);
            None
        }
        Err(e) => {
            warn!("Failed to read '{}', using empty default: {}", key, e);
            None
        }
    }
}

/// Serialize `value` as JSON and write it under `key`. Failures are logged
/// and swallowed.
pub async fn save_json<S: Store, T: Serialize + ?Sized>(store: &S, key: &str, value: &T) {
    let text = match serde_json::to_string(value) {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to serialize '{}': {}", key, e);
            return;
        }
    };
    save_text(store, key, &text).await;
}

pub async fn save_text<S: Store>(store: &S, key: &str, text: &str) {
    if let Err(e) = store.set(key, text).await {
        error!("Failed to persist '{}': {}", key, e);
    }
}

/// In-process store, the headless stand-in for browser storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw text currently stored under `key`
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    /// Overwrite `key` with arbitrary text, bypassing serialization
    pub fn put_raw(&self, key: &str, text: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), text.to_string());
        }
    }
}

impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// SQLite-backed store partitioned by origin.
pub struct SqliteStore {
    pool: SqlitePool,
    origin: String,
}

impl SqliteStore {
    pub async fn new(database_url: &str, origin: &str) -> anyhow::Result<Self> {
        // Every in-memory connection is its own database
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self {
            pool,
            origin: origin.to_string(),
        })
    }

    /// Another view on the same database for a different origin
    pub fn for_origin(&self, origin: &str) -> Self {
        Self {
            pool: self.pool.clone(),
            origin: origin.to_string(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub async fn initialize(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                origin TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (origin, key)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl Store for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM kv_store WHERE origin = ? AND key = ?")
                .bind(&self.origin)
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO kv_store (origin, key, value, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(origin, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&self.origin)
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
