//! Article data produced by the site builder (`data/items.json`).

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::feeds::normalize_category;
use crate::filter::slugify;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub published: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemsFile {
    #[serde(default)]
    items: Vec<Article>,
}

/// A category chip: label, slug and number of articles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub label: String,
    pub slug: String,
    pub count: usize,
}

/// The static page before any personalization is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSource {
    pub title: String,
    pub articles: Vec<Article>,
}

impl PageSource {
    pub fn new(title: &str, articles: Vec<Article>) -> Self {
        let articles = articles
            .into_iter()
            .map(|mut article| {
                article.category = normalize_category(Some(&article.category));
                article
            })
            .collect();
        Self {
            title: title.to_string(),
            articles,
        }
    }

    pub fn load<P: AsRef<Path>>(path: P, title: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content, title)
    }

    pub fn from_json(content: &str, title: &str) -> anyhow::Result<Self> {
        let file: ItemsFile = serde_json::from_str(content)?;
        Ok(Self::new(title, file.items))
    }

    /// Chip data, most populated category first, ties alphabetical.
    pub fn category_counts(&self) -> Vec<CategoryCount> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for article in &self.articles {
            *counts.entry(article.category.as_str()).or_default() += 1;
        }

        let mut chips: Vec<CategoryCount> = counts
            .into_iter()
            .map(|(label, count)| CategoryCount {
                label: label.to_string(),
                slug: slugify(label),
                count,
            })
            .collect();
        chips.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.label.to_lowercase().cmp(&b.label.to_lowercase()))
        });
        chips
    }
}
