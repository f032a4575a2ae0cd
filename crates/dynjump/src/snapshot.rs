//! Reading the rendered feed.
//!
//! [`FeedDocument`] is the capability interface over the live host page:
//! the queries and the handful of mutations the engine needs. The
//! [`FeedSnapshotReader`] turns its raw time labels into dated
//! [`FeedItem`]s so the search logic can run against synthetic feeds.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::time_parser::TimeParser;
use crate::types::{FeedItem, Result, SearchError};

/// CSS selectors that locate feed items and their time labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSelectors {
    /// Structural marker of one feed item.
    pub item: String,
    /// Primary time-label element inside an item.
    pub time_label: String,
    /// Consulted in order when the primary label is missing.
    pub time_fallbacks: Vec<String>,
}

impl Default for FeedSelectors {
    fn default() -> Self {
        Self {
            item: ".bili-dyn-item".to_string(),
            time_label: ".bili-dyn-time".to_string(),
            time_fallbacks: vec![
                r#"[class*="time"]"#.to_string(),
                r#"span[class*="time"]"#.to_string(),
            ],
        }
    }
}

/// Time-label text of one rendered item, before parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFeedItem {
    /// Text of the primary label, if the item has one.
    pub time_label: Option<String>,
    /// Texts of fallback label candidates, in selector order.
    pub fallback_labels: Vec<String>,
}

impl RawFeedItem {
    /// Item with only a primary label.
    pub fn labeled(text: impl Into<String>) -> Self {
        Self {
            time_label: Some(text.into()),
            fallback_labels: Vec::new(),
        }
    }
}

/// The live host document.
///
/// Items are returned in host order: index 0 is the newest visible item and
/// higher indices are older, so lazy loading appends older items.
#[async_trait]
pub trait FeedDocument: Send + Sync {
    /// Every feed item currently rendered.
    async fn feed_items(&self) -> Result<Vec<RawFeedItem>>;
    /// Current scrollable height of the viewport's document, in pixels.
    async fn scroll_height(&self) -> Result<i64>;
    /// Scroll the viewport to an absolute vertical position.
    async fn scroll_to(&self, top: i64) -> Result<()>;
    /// Scroll the viewport by a vertical delta.
    async fn scroll_by(&self, delta: i64) -> Result<()>;
    /// Mark the item at `index` as the found target and bring it into view.
    async fn highlight(&self, index: usize) -> Result<()>;
}

/// Turns a document's raw items into dated [`FeedItem`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedSnapshotReader {
    parser: TimeParser,
}

impl FeedSnapshotReader {
    pub fn new(parser: TimeParser) -> Self {
        Self { parser }
    }

    /// Capture the items currently rendered by `document`.
    pub async fn snapshot(&self, document: &dyn FeedDocument) -> Result<Vec<FeedItem>> {
        let raw = document.feed_items().await?;
        Ok(self.date_items(&raw))
    }

    /// Parse the dates of already-extracted raw items.
    ///
    /// A present primary label is authoritative; fallbacks are consulted only
    /// when it is missing, and the first one that parses wins.
    pub fn date_items(&self, raw: &[RawFeedItem]) -> Vec<FeedItem> {
        raw.iter()
            .enumerate()
            .map(|(index, item)| {
                let date = match &item.time_label {
                    Some(label) => self.parser.parse(label),
                    None => item
                        .fallback_labels
                        .iter()
                        .find_map(|label| self.parser.parse(label)),
                };
                FeedItem { index, date }
            })
            .collect()
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| SearchError::Selector(format!("{css}: {e}")))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Extract raw feed items from a serialized document.
pub fn parse_feed_html(html: &str, selectors: &FeedSelectors) -> Result<Vec<RawFeedItem>> {
    let item_sel = selector(&selectors.item)?;
    let label_sel = selector(&selectors.time_label)?;
    let fallback_sels = selectors
        .time_fallbacks
        .iter()
        .map(|css| selector(css))
        .collect::<Result<Vec<_>>>()?;

    let doc = Html::parse_document(html);
    let items = doc
        .select(&item_sel)
        .map(|item| {
            let time_label = item.select(&label_sel).next().map(element_text);
            let fallback_labels = if time_label.is_some() {
                Vec::new()
            } else {
                fallback_sels
                    .iter()
                    .filter_map(|sel| item.select(sel).next().map(element_text))
                    .collect()
            };
            RawFeedItem {
                time_label,
                fallback_labels,
            }
        })
        .collect();
    Ok(items)
}
