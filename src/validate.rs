use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Errors shown to the user when the "add source" form is rejected.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter both a name and a feed URL.")]
    MissingFields,

    #[error("Please enter a valid URL (e.g. https://example.com/rss): {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Raw "add source" form input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub category: String,
}

/// Form input that passed validation. Text fields are single-line and the
/// URL is in its parsed, serialized form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidFeed {
    pub name: String,
    pub url: String,
    pub category: Option<String>,
}

impl FeedForm {
    pub fn new(name: &str, url: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            category: category.to_string(),
        }
    }

    /// Both fields must be non-empty after trimming and the URL must parse
    /// as an absolute URL.
    pub fn validate(&self) -> Result<ValidFeed, ValidationError> {
        let name = single_line(&self.name);
        let url = self.url.trim();
        if name.is_empty() || url.is_empty() {
            return Err(ValidationError::MissingFields);
        }

        // The parser drops embedded tabs and newlines, so keep its output
        let url = Url::parse(url)?.to_string();

        let category = match single_line(&self.category) {
            c if c.is_empty() => None,
            c => Some(c),
        };

        Ok(ValidFeed {
            name,
            url,
            category,
        })
    }
}

/// Collapse every run of whitespace or control characters into one space
/// and trim the ends.
pub fn single_line(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
