//! Progress vs. stagnation bookkeeping across load attempts.

use serde::{Deserialize, Serialize};

use crate::types::{ScrollConfig, TargetSpec};

/// Classification of one load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoadProgress {
    /// New items appeared.
    Progress { added: usize },
    /// Nothing new; `retries` consecutive stagnant attempts so far.
    Stagnation { retries: u32 },
}

/// Progress iff the item count grew.
pub fn classify(current_count: usize, last_count: usize) -> bool {
    current_count > last_count
}

/// Mutable state of the single in-flight search.
///
/// Created by `start`, advanced once per cycle, dropped on any terminal
/// outcome. Whether a run is in flight lives on the controller's active
/// generation, so there is no running flag here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchState {
    pub target: TargetSpec,
    pub retry_count: u32,
    pub max_retries: u32,
    pub last_item_count: usize,
    pub scroll_count: u32,
}

impl SearchState {
    pub fn new(target: TargetSpec, config: &ScrollConfig) -> Self {
        Self {
            target,
            retry_count: 0,
            max_retries: config.max_retries,
            last_item_count: 0,
            scroll_count: 0,
        }
    }

    /// Record the item count seen after a load attempt.
    ///
    /// Progress resets the retry counter and remembers the new count;
    /// stagnation increments the counter.
    pub fn record_load(&mut self, current_count: usize) -> LoadProgress {
        if classify(current_count, self.last_item_count) {
            let added = current_count - self.last_item_count;
            self.retry_count = 0;
            self.last_item_count = current_count;
            LoadProgress::Progress { added }
        } else {
            self.retry_count += 1;
            LoadProgress::Stagnation {
                retries: self.retry_count,
            }
        }
    }

    /// Whether the retry budget is spent.
    pub fn is_exhausted(&self) -> bool {
        self.retry_count >= self.max_retries
    }
}
