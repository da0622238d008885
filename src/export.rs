use std::future::Future;
use std::sync::Mutex;

use thiserror::Error;

use crate::feeds::FeedEntry;
use crate::validate::single_line;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard is not available")]
    Unavailable,

    #[error("clipboard write failed: {0}")]
    WriteFailed(String),
}

/// Where an export listing goes first. Failures fall back to an on-screen
/// listing, so implementations only report success or failure.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> impl Future<Output = Result<(), ClipboardError>> + Send;
}

/// No clipboard access; every export is shown on screen instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    async fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable)
    }
}

/// Keeps the last written text in memory.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut contents = self
            .contents
            .lock()
            .map_err(|e| ClipboardError::WriteFailed(e.to_string()))?;
        *contents = Some(text.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// No custom feeds; nothing was exported
    Empty,
    Copied { count: usize },
    /// Clipboard unavailable, listing shown on screen
    Displayed { count: usize },
}

/// One line per feed, ready to paste under `feeds:` in the site's
/// `feeds.yaml`. `None` when there is nothing to export.
pub fn render_listing(feeds: &[FeedEntry]) -> Option<String> {
    if feeds.is_empty() {
        return None;
    }
    let lines: Vec<String> = feeds.iter().map(listing_line).collect();
    Some(lines.join("\n"))
}

// Stored records may predate form validation, so every field is forced
// onto the one line.
fn listing_line(feed: &FeedEntry) -> String {
    format!(
        "  - {}  # {} ({})",
        single_line(&feed.url),
        single_line(&feed.name),
        single_line(&feed.category)
    )
}
