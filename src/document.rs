use url::Url;

use crate::feeds::FeedEntry;
use crate::filter::ALL_CATEGORIES;
use crate::page::{Article, PageSource};
use crate::render::{ControlBar, Counters};

pub const DELETED_CLASS: &str = "snd-deleted";
pub const DELETED_STYLE: &str = "opacity:0.45;background:#fef2f2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Per-article action shown next to a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleControl {
    Remove,
    Restore,
}

impl ArticleControl {
    pub fn label(&self) -> &'static str {
        match self {
            ArticleControl::Remove => "Remove",
            ArticleControl::Restore => "Restore",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    AddSource,
    ManageSources,
    DeletedArticles,
    Export,
}

impl Modal {
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "add-source" => Some(Modal::AddSource),
            "manage-sources" => Some(Modal::ManageSources),
            "deleted-articles" => Some(Modal::DeletedArticles),
            "export" => Some(Modal::Export),
            _ => None,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Modal::AddSource => "add-source",
            Modal::ManageSources => "manage-sources",
            Modal::DeletedArticles => "deleted-articles",
            Modal::Export => "export",
        }
    }
}

/// An outbound hyperlink inside a list item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleLink {
    pub node: NodeId,
    pub href: String,
    pub article_id: Option<String>,
    pub category: String,
    pub has_control: bool,
}

/// The page as seen by the controller.
///
/// Implementations own the actual rendering; the controller only issues
/// targeted updates through these methods.
pub trait Document {
    /// Insert the control bar and its dialogs into the primary content
    /// container. Returns false when there is no container.
    fn inject_control_bar(&mut self, bar: &ControlBar) -> bool;

    fn article_links(&self) -> Vec<ArticleLink>;

    /// Add a new control element to the item holding `node`.
    fn attach_control(&mut self, node: NodeId, control: ArticleControl);

    /// Relabel the existing control of the item holding `node`.
    fn set_control(&mut self, node: NodeId, control: ArticleControl);

    fn set_hidden(&mut self, node: NodeId, hidden: bool);

    fn set_saved(&mut self, node: NodeId, saved: bool);

    fn set_filtered(&mut self, node: NodeId, filtered: bool);

    fn set_active_chip(&mut self, slug: &str);

    fn set_badges(&mut self, counters: &Counters);

    fn open_modal(&mut self, modal: Modal);

    fn close_modal(&mut self);

    fn active_modal(&self) -> Option<Modal>;

    fn render_feed_list(&mut self, feeds: &[FeedEntry]);

    fn render_deleted_list(&mut self, urls: &[String]);

    /// Blocking notice (an alert in a browser).
    fn notify(&mut self, message: &str);

    /// Show text the user can copy by hand.
    fn show_listing(&mut self, listing: &str);

    /// Throw away every change and return to the pristine page.
    fn reload(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub node: NodeId,
    pub article: Article,
    pub controls: Vec<ArticleControl>,
    pub hidden: bool,
    pub saved: bool,
    pub filtered: bool,
}

impl ListItem {
    fn new(index: usize, article: Article) -> Self {
        Self {
            node: NodeId(index),
            article,
            controls: Vec::new(),
            hidden: false,
            saved: false,
            filtered: false,
        }
    }

    pub fn is_outbound(&self) -> bool {
        Url::parse(&self.article.link)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false)
    }

    pub fn class_attr(&self) -> &'static str {
        if self.hidden {
            DELETED_CLASS
        } else {
            ""
        }
    }

    pub fn style_attr(&self) -> String {
        let mut style = Vec::new();
        if self.hidden {
            style.push(DELETED_STYLE);
        }
        if self.filtered {
            style.push("display:none");
        }
        style.join(";")
    }

    pub fn star(&self) -> &'static str {
        if self.saved {
            "★"
        } else {
            "☆"
        }
    }
}

/// In-memory document built from a [`PageSource`].
#[derive(Debug, Clone)]
pub struct HeadlessDocument {
    source: PageSource,
    has_container: bool,
    items: Vec<ListItem>,
    control_bar: Option<ControlBar>,
    counters: Counters,
    modal: Option<Modal>,
    feed_rows: Vec<FeedEntry>,
    deleted_rows: Vec<String>,
    notices: Vec<String>,
    listing: Option<String>,
    active_chip: String,
    reloads: usize,
}

impl HeadlessDocument {
    pub fn new(source: PageSource) -> Self {
        let items = build_items(&source);
        Self {
            source,
            has_container: true,
            items,
            control_bar: None,
            counters: Counters::default(),
            modal: None,
            feed_rows: Vec::new(),
            deleted_rows: Vec::new(),
            notices: Vec::new(),
            listing: None,
            active_chip: ALL_CATEGORIES.to_string(),
            reloads: 0,
        }
    }

    /// A page whose template lacks the primary content container.
    pub fn without_container(source: PageSource) -> Self {
        Self {
            has_container: false,
            ..Self::new(source)
        }
    }

    pub fn source(&self) -> &PageSource {
        &self.source
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn control_bar(&self) -> Option<&ControlBar> {
        self.control_bar.as_ref()
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn feed_rows(&self) -> &[FeedEntry] {
        &self.feed_rows
    }

    pub fn deleted_rows(&self) -> &[String] {
        &self.deleted_rows
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// Notices are shown once.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    pub fn listing(&self) -> Option<&str> {
        self.listing.as_deref()
    }

    pub fn active_chip(&self) -> &str {
        &self.active_chip
    }

    pub fn reloads(&self) -> usize {
        self.reloads
    }

    fn item_mut(&mut self, node: NodeId) -> Option<&mut ListItem> {
        self.items.iter_mut().find(|item| item.node == node)
    }
}

fn build_items(source: &PageSource) -> Vec<ListItem> {
    source
        .articles
        .iter()
        .cloned()
        .enumerate()
        .map(|(index, article)| ListItem::new(index, article))
        .collect()
}

impl Document for HeadlessDocument {
    fn inject_control_bar(&mut self, bar: &ControlBar) -> bool {
        if !self.has_container {
            return false;
        }
        self.control_bar = Some(bar.clone());
        true
    }

    fn article_links(&self) -> Vec<ArticleLink> {
        self.items
            .iter()
            .filter(|item| item.is_outbound())
            .map(|item| ArticleLink {
                node: item.node,
                href: item.article.link.clone(),
                article_id: Some(item.article.id.clone()).filter(|id| !id.is_empty()),
                category: item.article.category.clone(),
                has_control: !item.controls.is_empty(),
            })
            .collect()
    }

    fn attach_control(&mut self, node: NodeId, control: ArticleControl) {
        if let Some(item) = self.item_mut(node) {
            item.controls.push(control);
        }
    }

    fn set_control(&mut self, node: NodeId, control: ArticleControl) {
        if let Some(item) = self.item_mut(node) {
            match item.controls.first_mut() {
                Some(existing) => *existing = control,
                None => item.controls.push(control),
            }
        }
    }

    fn set_hidden(&mut self, node: NodeId, hidden: bool) {
        if let Some(item) = self.item_mut(node) {
            item.hidden = hidden;
        }
    }

    fn set_saved(&mut self, node: NodeId, saved: bool) {
        if let Some(item) = self.item_mut(node) {
            item.saved = saved;
        }
    }

    fn set_filtered(&mut self, node: NodeId, filtered: bool) {
        if let Some(item) = self.item_mut(node) {
            item.filtered = filtered;
        }
    }

    fn set_active_chip(&mut self, slug: &str) {
        self.active_chip = slug.to_string();
    }

    fn set_badges(&mut self, counters: &Counters) {
        self.counters = *counters;
        if let Some(bar) = self.control_bar.as_mut() {
            *bar = ControlBar::new(counters);
        }
    }

    fn open_modal(&mut self, modal: Modal) {
        self.modal = Some(modal);
    }

    fn close_modal(&mut self) {
        self.modal = None;
        self.listing = None;
    }

    fn active_modal(&self) -> Option<Modal> {
        self.modal
    }

    fn render_feed_list(&mut self, feeds: &[FeedEntry]) {
        self.feed_rows = feeds.to_vec();
    }

    fn render_deleted_list(&mut self, urls: &[String]) {
        self.deleted_rows = urls.to_vec();
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }

    fn show_listing(&mut self, listing: &str) {
        self.listing = Some(listing.to_string());
        self.modal = Some(Modal::Export);
    }

    fn reload(&mut self) {
        let reloads = self.reloads + 1;
        let has_container = self.has_container;
        *self = Self::new(self.source.clone());
        self.has_container = has_container;
        self.reloads = reloads;
    }
}
