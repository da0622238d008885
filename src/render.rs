//! Translation of registry state into document updates.
//!
//! Nothing here touches the store; every function takes the current
//! collections and patches the document to match.

use crate::document::{ArticleControl, ArticleLink, Document};
use crate::feeds::FeedEntry;

/// Aggregate counts shown on the control bar. Always derived, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub custom_feeds: usize,
    pub enabled_feeds: usize,
    pub deleted_articles: usize,
}

impl Counters {
    pub fn from_state(feeds: &[FeedEntry], deleted: &[String]) -> Self {
        Self {
            custom_feeds: feeds.len(),
            enabled_feeds: feeds.iter().filter(|f| f.enabled).count(),
            deleted_articles: deleted.len(),
        }
    }
}

/// The injected row of buttons, labelled with the current counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlBar {
    pub add_label: String,
    pub manage_label: String,
    pub deleted_label: String,
}

impl ControlBar {
    pub fn new(counters: &Counters) -> Self {
        Self {
            add_label: "+ Add Source".to_string(),
            manage_label: manage_label(counters),
            deleted_label: deleted_label(counters),
        }
    }
}

pub fn manage_label(counters: &Counters) -> String {
    format!(
        "Manage Sources ({}, {} enabled)",
        counters.custom_feeds, counters.enabled_feeds
    )
}

pub fn deleted_label(counters: &Counters) -> String {
    format!("Deleted Articles ({})", counters.deleted_articles)
}

pub fn control_for(deleted: bool) -> ArticleControl {
    if deleted {
        ArticleControl::Restore
    } else {
        ArticleControl::Remove
    }
}

/// Attach a control to every link that has none yet and relabel the ones
/// that do, so a second pass never stacks controls or leaves a stale label.
/// Returns how many links were newly decorated.
pub fn decorate_links<D, F>(doc: &mut D, links: &[ArticleLink], is_deleted: F) -> usize
where
    D: Document,
    F: Fn(&str) -> bool,
{
    let mut decorated = 0;
    for link in links {
        let control = control_for(is_deleted(&link.href));
        if link.has_control {
            doc.set_control(link.node, control);
        } else {
            doc.attach_control(link.node, control);
            decorated += 1;
        }
    }
    decorated
}

/// Bring every item whose link is `url` in line with its deleted state.
pub fn apply_article_state<D: Document>(
    doc: &mut D,
    links: &[ArticleLink],
    url: &str,
    deleted: bool,
) {
    for link in links.iter().filter(|l| l.href == url) {
        doc.set_control(link.node, control_for(deleted));
        doc.set_hidden(link.node, deleted);
    }
}

pub fn apply_hidden<D, F>(doc: &mut D, links: &[ArticleLink], is_deleted: F)
where
    D: Document,
    F: Fn(&str) -> bool,
{
    for link in links {
        doc.set_hidden(link.node, is_deleted(&link.href));
    }
}

pub fn apply_saved<D, F>(doc: &mut D, links: &[ArticleLink], is_saved: F)
where
    D: Document,
    F: Fn(&str) -> bool,
{
    for link in links {
        if let Some(id) = &link.article_id {
            doc.set_saved(link.node, is_saved(id));
        }
    }
}

pub fn apply_filter<D, F>(doc: &mut D, links: &[ArticleLink], active: &str, shows: F)
where
    D: Document,
    F: Fn(&str) -> bool,
{
    for link in links {
        doc.set_filtered(link.node, !shows(&link.category));
    }
    doc.set_active_chip(active);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{HeadlessDocument, NodeId};
    use crate::filter::{category_visible, ALL_CATEGORIES};
    use crate::page::{Article, PageSource};
    use chrono::Utc;

    fn article(id: &str, link: &str, category: &str) -> Article {
        Article {
            id: id.to_string(),
            title: format!("Title {}", id),
            link: link.to_string(),
            source: String::new(),
            category: category.to_string(),
            summary: String::new(),
            published: None,
        }
    }

    fn create_doc() -> HeadlessDocument {
        HeadlessDocument::new(PageSource::new(
            "t",
            vec![
                article("a1", "https://news.example.com/a1", "Health"),
                article("a2", "https://news.example.com/a2", "Travel"),
                article("a3", "https://news.example.com/a1", "Health"),
            ],
        ))
    }

    #[test]
    fn test_counters_from_state() {
        let feeds = vec![
            FeedEntry {
                id: 1,
                name: "A".to_string(),
                url: "https://a.example".to_string(),
                category: "General".to_string(),
                date_added: Utc::now(),
                enabled: false,
            },
            FeedEntry {
                id: 2,
                name: "B".to_string(),
                url: "https://b.example".to_string(),
                category: "General".to_string(),
                date_added: Utc::now(),
                enabled: true,
            },
        ];
        let deleted = vec!["https://x.example".to_string()];

        let counters = Counters::from_state(&feeds, &deleted);
        assert_eq!(
            counters,
            Counters {
                custom_feeds: 2,
                enabled_feeds: 1,
                deleted_articles: 1
            }
        );
    }

    #[test]
    fn test_labels_include_counts() {
        let bar = ControlBar::new(&Counters {
            custom_feeds: 3,
            enabled_feeds: 2,
            deleted_articles: 7,
        });

        assert!(bar.manage_label.contains('3'));
        assert!(bar.manage_label.contains("2 enabled"));
        assert_eq!(bar.deleted_label, "Deleted Articles (7)");
    }

    #[test]
    fn test_decorate_skips_links_with_controls() {
        let mut doc = create_doc();
        let links = doc.article_links();
        assert_eq!(decorate_links(&mut doc, &links, |_| false), 3);

        let links = doc.article_links();
        assert_eq!(decorate_links(&mut doc, &links, |_| false), 0);
        assert!(doc.items().iter().all(|item| item.controls.len() == 1));
    }

    #[test]
    fn test_decorate_relabels_existing_controls() {
        let mut doc = create_doc();
        let links = doc.article_links();
        decorate_links(&mut doc, &links, |_| false);

        let links = doc.article_links();
        decorate_links(&mut doc, &links, |url| url == "https://news.example.com/a1");

        let items = doc.items();
        assert_eq!(items[0].controls, vec![ArticleControl::Restore]);
        assert_eq!(items[1].controls, vec![ArticleControl::Remove]);
        assert_eq!(items[2].controls, vec![ArticleControl::Restore]);
    }

    #[test]
    fn test_apply_article_state_patches_every_matching_item() {
        let mut doc = create_doc();
        let links = doc.article_links();
        decorate_links(&mut doc, &links, |_| false);

        apply_article_state(&mut doc, &links, "https://news.example.com/a1", true);

        let items = doc.items();
        assert!(items[0].hidden);
        assert!(!items[1].hidden);
        assert!(items[2].hidden);
        assert_eq!(items[0].controls, vec![ArticleControl::Restore]);
        assert_eq!(items[1].controls, vec![ArticleControl::Remove]);
    }

    #[test]
    fn test_apply_filter_hides_other_categories() {
        let mut doc = create_doc();
        let links = doc.article_links();

        apply_filter(&mut doc, &links, "travel", |c| category_visible("travel", c));

        let filtered: Vec<NodeId> = doc
            .items()
            .iter()
            .filter(|i| i.filtered)
            .map(|i| i.node)
            .collect();
        assert_eq!(filtered.len(), 2);
        assert_eq!(doc.active_chip(), "travel");

        apply_filter(&mut doc, &links, ALL_CATEGORIES, |c| {
            category_visible(ALL_CATEGORIES, c)
        });
        assert!(doc.items().iter().all(|i| !i.filtered));
    }
}
