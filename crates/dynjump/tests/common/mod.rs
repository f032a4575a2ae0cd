#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::FixedOffset;
use dynjump::{FeedDocument, FeedSnapshotReader, RawFeedItem, Result, SearchError, TimeParser};

/// A scroll command observed by the fake document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scroll {
    To(i64),
    By(i64),
}

/// Fake feed whose content grows by one batch per snapshot.
///
/// Snapshot `n` returns batches `0..=n` concatenated; once the batches run
/// out the feed stops growing. Built with [`ScriptedFeed::frames`], snapshot
/// `n` instead returns batch `n` alone, so content can change while the item
/// count stays flat.
pub struct ScriptedFeed {
    batches: Vec<Vec<RawFeedItem>>,
    cumulative: bool,
    snapshots: AtomicUsize,
    scrolls: Mutex<Vec<Scroll>>,
    highlighted: Mutex<Vec<usize>>,
    fail_items: bool,
    fail_highlight: bool,
}

impl ScriptedFeed {
    pub fn new(batches: &[&[&str]]) -> Self {
        Self {
            batches: batches
                .iter()
                .map(|batch| batch.iter().map(|l| RawFeedItem::labeled(*l)).collect())
                .collect(),
            cumulative: true,
            snapshots: AtomicUsize::new(0),
            scrolls: Mutex::new(Vec::new()),
            highlighted: Mutex::new(Vec::new()),
            fail_items: false,
            fail_highlight: false,
        }
    }

    /// Each snapshot shows one whole frame; the last frame repeats.
    pub fn frames(frames: &[&[&str]]) -> Self {
        Self {
            cumulative: false,
            ..Self::new(frames)
        }
    }

    pub fn empty() -> Self {
        Self::new(&[])
    }

    pub fn failing_items(mut self) -> Self {
        self.fail_items = true;
        self
    }

    pub fn failing_highlight(mut self) -> Self {
        self.fail_highlight = true;
        self
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.load(Ordering::SeqCst)
    }

    pub fn scrolls(&self) -> Vec<Scroll> {
        self.scrolls.lock().unwrap().clone()
    }

    pub fn highlighted(&self) -> Vec<usize> {
        self.highlighted.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedDocument for ScriptedFeed {
    async fn feed_items(&self) -> Result<Vec<RawFeedItem>> {
        if self.fail_items {
            return Err(SearchError::Host("page closed".to_string()));
        }
        let n = self.snapshots.fetch_add(1, Ordering::SeqCst);
        if !self.cumulative {
            let last = self.batches.len().saturating_sub(1);
            return Ok(self.batches.get(n.min(last)).cloned().unwrap_or_default());
        }
        Ok(self
            .batches
            .iter()
            .take(n + 1)
            .flat_map(|batch| batch.iter().cloned())
            .collect())
    }

    async fn scroll_height(&self) -> Result<i64> {
        Ok(10_000)
    }

    async fn scroll_to(&self, top: i64) -> Result<()> {
        self.scrolls.lock().unwrap().push(Scroll::To(top));
        Ok(())
    }

    async fn scroll_by(&self, delta: i64) -> Result<()> {
        self.scrolls.lock().unwrap().push(Scroll::By(delta));
        Ok(())
    }

    async fn highlight(&self, index: usize) -> Result<()> {
        if self.fail_highlight {
            return Err(SearchError::Host("element detached".to_string()));
        }
        self.highlighted.lock().unwrap().push(index);
        Ok(())
    }
}

/// Reader pinned to UTC+8 so absolute labels parse the same everywhere.
pub fn reader() -> FeedSnapshotReader {
    FeedSnapshotReader::new(TimeParser::new(FixedOffset::east_opt(8 * 3600).unwrap()))
}
