use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::deleted::DeletionRegistry;
use crate::document::{Document, Modal};
use crate::export::{render_listing, Clipboard, ExportOutcome};
use crate::feeds::{FeedEntry, FeedRegistry};
use crate::filter::CategoryFilter;
use crate::render::{self, ControlBar, Counters};
use crate::saved::SavedRegistry;
use crate::store::{StorageKeys, Store};
use crate::validate::{FeedForm, ValidationError};

struct State<S> {
    feeds: FeedRegistry<S>,
    deleted: DeletionRegistry<S>,
    saved: SavedRegistry<S>,
    filter: CategoryFilter<S>,
}

impl<S: Store> State<S> {
    async fn load(store: &Arc<S>, keys: &StorageKeys) -> Self {
        Self {
            feeds: FeedRegistry::load(store.clone(), &keys.feeds).await,
            deleted: DeletionRegistry::load(store.clone(), &keys.deleted).await,
            saved: SavedRegistry::load(store.clone(), &keys.saved).await,
            filter: CategoryFilter::load(store.clone(), &keys.active_category).await,
        }
    }
}

/// Bridges user actions to the registries and keeps the document in step
/// with persisted state.
pub struct SyncController<S, D, C> {
    store: Arc<S>,
    keys: StorageKeys,
    document: D,
    clipboard: C,
    state: State<S>,
}

impl<S: Store, D: Document, C: Clipboard> SyncController<S, D, C> {
    /// Load persisted state and run the page-load bootstrap on `document`.
    pub async fn start(store: Arc<S>, keys: StorageKeys, document: D, clipboard: C) -> Self {
        let state = State::load(&store, &keys).await;
        let mut controller = Self {
            store,
            keys,
            document,
            clipboard,
            state,
        };
        controller.render_page();
        controller
    }

    /// Re-read everything from the store and decorate the page, as on a
    /// fresh page load.
    pub async fn bootstrap(&mut self) {
        self.state = State::load(&self.store, &self.keys).await;
        self.render_page();
    }

    fn render_page(&mut self) {
        let counters = self.counters();
        if !self.document.inject_control_bar(&ControlBar::new(&counters)) {
            warn!("No content container on page, skipping control bar");
        }

        let links = self.document.article_links();
        let state = &self.state;
        let decorated =
            render::decorate_links(&mut self.document, &links, |url| state.deleted.is_deleted(url));
        render::apply_hidden(&mut self.document, &links, |url| state.deleted.is_deleted(url));
        render::apply_saved(&mut self.document, &links, |id| state.saved.is_saved(id));
        render::apply_filter(&mut self.document, &links, state.filter.active(), |c| {
            state.filter.shows(c)
        });
        self.document.set_badges(&counters);

        debug!(
            "Bootstrapped page: {} links, {} newly decorated, {} deleted",
            links.len(),
            decorated,
            counters.deleted_articles
        );
    }

    pub fn counters(&self) -> Counters {
        Counters::from_state(self.state.feeds.list(), self.state.deleted.list())
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn feeds(&self) -> &FeedRegistry<S> {
        &self.state.feeds
    }

    pub fn deleted(&self) -> &DeletionRegistry<S> {
        &self.state.deleted
    }

    pub fn saved(&self) -> &SavedRegistry<S> {
        &self.state.saved
    }

    pub fn filter(&self) -> &CategoryFilter<S> {
        &self.state.filter
    }

    // Feed registry actions

    /// Validate the "add source" form and record the feed. Invalid input
    /// raises a notice and leaves all state untouched.
    pub async fn submit_feed(&mut self, form: &FeedForm) -> Result<FeedEntry, ValidationError> {
        let valid = match form.validate() {
            Ok(valid) => valid,
            Err(e) => {
                warn!("Rejected custom feed: {}", e);
                self.document.notify(&e.to_string());
                return Err(e);
            }
        };

        let entry = self
            .state
            .feeds
            .add(&valid.name, &valid.url, valid.category.as_deref())
            .await;
        if self.document.active_modal() == Some(Modal::AddSource) {
            self.document.close_modal();
        }
        self.document.notify(&format!(
            "Added \"{}\". Export your sources to include it in the site's feed list.",
            entry.name
        ));
        self.sync_feeds();
        Ok(entry)
    }

    pub async fn remove_feed(&mut self, id: i64) {
        self.state.feeds.remove(id).await;
        self.sync_feeds();
    }

    pub async fn toggle_feed(&mut self, id: i64) {
        self.state.feeds.toggle(id).await;
        self.sync_feeds();
    }

    fn sync_feeds(&mut self) {
        let counters = self.counters();
        self.document.set_badges(&counters);
        if self.document.active_modal() == Some(Modal::ManageSources) {
            self.document.render_feed_list(self.state.feeds.list());
        }
    }

    // Deletion registry actions

    pub async fn delete_article(&mut self, url: &str) {
        self.state.deleted.mark_deleted(url).await;
        self.sync_article(url);
    }

    pub async fn restore_article(&mut self, url: &str) {
        self.state.deleted.restore(url).await;
        self.sync_article(url);
    }

    /// Patch only the items linking to `url` and the deleted badge.
    fn sync_article(&mut self, url: &str) {
        let links = self.document.article_links();
        let deleted = self.state.deleted.is_deleted(url);
        render::apply_article_state(&mut self.document, &links, url, deleted);

        let counters = self.counters();
        self.document.set_badges(&counters);
        if self.document.active_modal() == Some(Modal::DeletedArticles) {
            self.document.render_deleted_list(self.state.deleted.list());
        }
    }

    /// Restore every article at once. The page is reloaded rather than
    /// patched item by item.
    pub async fn clear_deleted(&mut self) {
        self.state.deleted.clear_all().await;
        self.document.reload();
        self.bootstrap().await;
    }

    // Supplementary page state

    pub async fn toggle_saved(&mut self, article_id: &str) -> bool {
        let saved = self.state.saved.toggle(article_id).await;
        let links = self.document.article_links();
        for link in links
            .iter()
            .filter(|l| l.article_id.as_deref() == Some(article_id))
        {
            self.document.set_saved(link.node, saved);
        }
        saved
    }

    pub async fn select_category(&mut self, slug: &str) {
        self.state.filter.select(slug).await;
        let links = self.document.article_links();
        let filter = &self.state.filter;
        render::apply_filter(&mut self.document, &links, filter.active(), |c| {
            filter.shows(c)
        });
    }

    // Dialogs

    pub fn open_modal(&mut self, modal: Modal) {
        match modal {
            Modal::ManageSources => self.document.render_feed_list(self.state.feeds.list()),
            Modal::DeletedArticles => self.document.render_deleted_list(self.state.deleted.list()),
            Modal::Export => {
                if let Some(listing) = render_listing(self.state.feeds.list()) {
                    self.document.show_listing(&listing);
                    return;
                }
            }
            Modal::AddSource => {}
        }
        self.document.open_modal(modal);
    }

    pub fn close_modal(&mut self) {
        self.document.close_modal();
    }

    /// Hand the custom feeds to the user for manual merging into the
    /// build-time feed list. Never changes persisted state.
    pub async fn export_feeds(&mut self) -> ExportOutcome {
        let Some(listing) = render_listing(self.state.feeds.list()) else {
            self.document.notify("No custom sources to export yet.");
            return ExportOutcome::Empty;
        };
        let count = self.state.feeds.count();

        match self.clipboard.write_text(&listing).await {
            Ok(()) => {
                info!("Exported {} custom feeds to clipboard", count);
                self.document.notify(&format!(
                    "Copied {} source(s). Paste them under `feeds:` in data/feeds.yaml.",
                    count
                ));
                ExportOutcome::Copied { count }
            }
            Err(e) => {
                warn!("Clipboard write failed, showing export on screen: {}", e);
                self.document.show_listing(&listing);
                ExportOutcome::Displayed { count }
            }
        }
    }
}
