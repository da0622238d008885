//! Integration tests for the snd-personal state manager
//!
//! These tests drive the public API the way the page does: bootstrap,
//! user actions, then a fresh bootstrap standing in for a page reload.

use std::io::Write;
use tempfile::NamedTempFile;

mod common {
    use snd_personal::page::{Article, PageSource};
    use tempfile::TempDir;

    /// Create a temporary directory for test databases
    pub fn create_temp_dir() -> TempDir {
        tempfile::tempdir().expect("Failed to create temp directory")
    }

    /// Create a test database path
    pub fn create_db_path(temp_dir: &TempDir) -> String {
        let db_path = temp_dir.path().join("test.db");
        format!("sqlite:{}?mode=rwc", db_path.display())
    }

    pub fn create_page() -> PageSource {
        let article = |id: &str, category: &str| Article {
            id: id.to_string(),
            title: format!("Story {}", id),
            link: format!("https://news.example.com/{}", id),
            source: "Example".to_string(),
            category: category.to_string(),
            summary: String::new(),
            published: None,
        };
        PageSource::new(
            "Senior News Daily",
            vec![
                article("a1", "Health"),
                article("a2", "Finance"),
                article("a3", "Health"),
            ],
        )
    }
}

#[cfg(test)]
mod config_integration_tests {
    use super::*;
    use snd_personal::config::Config;

    #[test]
    fn test_load_actual_personal_config() {
        let config = Config::load("personal.toml");
        assert!(
            config.is_ok(),
            "Failed to load personal.toml: {:?}",
            config.err()
        );

        let config = config.unwrap();
        assert!(!config.namespace.is_empty());
        assert_eq!(config.storage_keys().feeds, format!("{}_custom_feeds", config.namespace));
    }

    #[test]
    fn test_config_from_file() {
        let toml_content = r#"
            namespace = "test"
            origin = "https://seniornews.example"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.storage_keys().deleted, "test_deleted_articles");
        assert_eq!(config.origin, "https://seniornews.example");
        assert_eq!(config.items_path, "data/items.json");
    }

    #[test]
    fn test_sample_items_file_parses() {
        let page = snd_personal::page::PageSource::load("data/items.json", "t").unwrap();
        assert!(!page.articles.is_empty());
    }
}

#[cfg(test)]
mod registry_integration_tests {
    use snd_personal::deleted::DeletionRegistry;
    use snd_personal::export::render_listing;
    use snd_personal::feeds::FeedRegistry;
    use snd_personal::store::{MemoryStore, StorageKeys};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_add_feed_then_export_scenario() {
        let store = Arc::new(MemoryStore::new());
        let keys = StorageKeys::default();
        let mut feeds = FeedRegistry::load(store, &keys.feeds).await;

        feeds
            .add("Senior Living Magazine", "https://example.com/rss", Some("Lifestyle"))
            .await;
        assert_eq!(feeds.count(), 1);

        let listing = render_listing(feeds.list()).unwrap();
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("https://example.com/rss"));
        assert!(lines[0].contains("Senior Living Magazine"));
        assert!(lines[0].contains("Lifestyle"));
    }

    #[tokio::test]
    async fn test_registries_share_store_without_interference() {
        let store = Arc::new(MemoryStore::new());
        let keys = StorageKeys::default();
        let mut feeds = FeedRegistry::load(store.clone(), &keys.feeds).await;
        let mut deleted = DeletionRegistry::load(store.clone(), &keys.deleted).await;

        feeds.add("A", "https://a.example/rss", None).await;
        deleted.mark_deleted("https://news.example.com/a1").await;
        deleted.clear_all().await;

        let feeds = FeedRegistry::load(store, &keys.feeds).await;
        assert_eq!(feeds.count(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_collections_load_empty() {
        let store = Arc::new(MemoryStore::new());
        let keys = StorageKeys::default();
        store.put_raw(&keys.feeds, "[{\"id\": ");
        store.put_raw(&keys.deleted, "42");

        let feeds = FeedRegistry::load(store.clone(), &keys.feeds).await;
        let deleted = DeletionRegistry::load(store, &keys.deleted).await;

        assert_eq!(feeds.count(), 0);
        assert_eq!(deleted.count(), 0);
    }
}

#[cfg(test)]
mod persistence_integration_tests {
    use super::common::*;
    use snd_personal::controller::SyncController;
    use snd_personal::document::{ArticleControl, HeadlessDocument};
    use snd_personal::export::NoClipboard;
    use snd_personal::store::{SqliteStore, StorageKeys};
    use snd_personal::validate::FeedForm;
    use std::sync::Arc;

    async fn open_store(db_url: &str) -> Arc<SqliteStore> {
        let store = SqliteStore::new(db_url, "local").await.unwrap();
        store.initialize().await.unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_deleted_article_survives_reopen() {
        let temp_dir = create_temp_dir();
        let db_url = create_db_path(&temp_dir);

        {
            let store = open_store(&db_url).await;
            let mut controller = SyncController::start(
                store,
                StorageKeys::default(),
                HeadlessDocument::new(create_page()),
                NoClipboard,
            )
            .await;
            controller.delete_article("https://news.example.com/a1").await;
        }

        // Fresh process, fresh page: bootstrap alone must reflect the delete
        {
            let store = open_store(&db_url).await;
            let controller = SyncController::start(
                store,
                StorageKeys::default(),
                HeadlessDocument::new(create_page()),
                NoClipboard,
            )
            .await;

            assert!(controller.deleted().is_deleted("https://news.example.com/a1"));
            let items = controller.document().items();
            assert!(items[0].hidden);
            assert_eq!(items[0].controls, vec![ArticleControl::Restore]);
            assert!(!items[1].hidden);
        }
    }

    #[tokio::test]
    async fn test_full_feed_workflow_persists() {
        let temp_dir = create_temp_dir();
        let db_url = create_db_path(&temp_dir);

        let id = {
            let store = open_store(&db_url).await;
            let mut controller = SyncController::start(
                store,
                StorageKeys::default(),
                HeadlessDocument::new(create_page()),
                NoClipboard,
            )
            .await;

            let keep = controller
                .submit_feed(&FeedForm::new("Keep", "https://keep.example/rss", "Health"))
                .await
                .unwrap();
            let dropped = controller
                .submit_feed(&FeedForm::new("Drop", "https://drop.example/rss", ""))
                .await
                .unwrap();
            controller.toggle_feed(keep.id).await;
            controller.remove_feed(dropped.id).await;
            assert!(controller
                .submit_feed(&FeedForm::new("Bad", "nope", ""))
                .await
                .is_err());
            keep.id
        };

        let store = open_store(&db_url).await;
        let controller = SyncController::start(
            store,
            StorageKeys::default(),
            HeadlessDocument::new(create_page()),
            NoClipboard,
        )
        .await;

        let feeds = controller.feeds().list();
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].id, id);
        assert!(!feeds[0].enabled);
        assert_eq!(feeds[0].category, "Health");
        assert_eq!(controller.document().counters().custom_feeds, 1);
        assert_eq!(controller.document().counters().enabled_feeds, 0);
    }

    #[tokio::test]
    async fn test_origins_do_not_share_state() {
        let temp_dir = create_temp_dir();
        let db_url = create_db_path(&temp_dir);
        let store = open_store(&db_url).await;
        let other = Arc::new(store.for_origin("https://elsewhere.example"));

        let mut controller = SyncController::start(
            store,
            StorageKeys::default(),
            HeadlessDocument::new(create_page()),
            NoClipboard,
        )
        .await;
        controller.delete_article("https://news.example.com/a2").await;

        let elsewhere = SyncController::start(
            other,
            StorageKeys::default(),
            HeadlessDocument::new(create_page()),
            NoClipboard,
        )
        .await;
        assert_eq!(elsewhere.deleted().count(), 0);
    }
}
