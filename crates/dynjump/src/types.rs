//! Core data types shared by every stage of a search run.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Earliest year a target may name. The host feed has no content before it.
pub const MIN_SUPPORTED_YEAR: i32 = 2009;

/// The calendar period a run is looking for.
///
/// An absent `day` matches any day of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub year: i32,
    pub month: u32,
    pub day: Option<u32>,
}

impl TargetSpec {
    /// Build a validated target.
    pub fn new(year: i32, month: u32, day: Option<u32>) -> Result<Self> {
        if year < MIN_SUPPORTED_YEAR {
            return Err(SearchError::InvalidTarget(format!(
                "year {year} is before {MIN_SUPPORTED_YEAR}"
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(SearchError::InvalidTarget(format!(
                "month {month} is outside 1-12"
            )));
        }
        if let Some(d) = day {
            if NaiveDate::from_ymd_opt(year, month, d).is_none() {
                return Err(SearchError::InvalidTarget(format!(
                    "{year}-{month:02} has no day {d}"
                )));
            }
        }
        Ok(Self { year, month, day })
    }

    /// Order `date` relative to this target at the granularity in effect.
    ///
    /// `Less` means the date is strictly earlier than the target period.
    pub fn compare(&self, date: &ParsedDate) -> Ordering {
        match self.day {
            Some(day) => (date.year, date.month, date.day).cmp(&(self.year, self.month, day)),
            None => (date.year, date.month).cmp(&(self.year, self.month)),
        }
    }

    /// Whether `date` falls inside the target period.
    pub fn matches(&self, date: &ParsedDate) -> bool {
        self.compare(date) == Ordering::Equal
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.day {
            Some(day) => write!(f, "{}年{}月{}日", self.year, self.month, day),
            None => write!(f, "{}年{}月", self.year, self.month),
        }
    }
}

/// A timestamp label normalized to a calendar date.
///
/// Derived from `original_text`; several labels may normalize to the same
/// date. `epoch_seconds` is monotonic with `(year, month, day)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub epoch_seconds: i64,
    pub original_text: String,
}

impl fmt::Display for ParsedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}年{}月{}日", self.year, self.month, self.day)
    }
}

/// One rendered feed entry as seen by a single snapshot.
///
/// `index` is the host's position: 0 is the newest visible item, higher
/// indices are older.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub index: usize,
    pub date: Option<ParsedDate>,
}

/// How hard the scroll driver pushes the host's lazy loader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggressiveness {
    /// Scroll to the bottom once.
    Normal,
    /// Bottom, then an extra push after a short pause.
    #[default]
    Aggressive,
    /// Three oversized scrolls in quick succession.
    Extreme,
}

impl fmt::Display for Aggressiveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Aggressive => write!(f, "aggressive"),
            Self::Extreme => write!(f, "extreme"),
        }
    }
}

impl FromStr for Aggressiveness {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "aggressive" => Ok(Self::Aggressive),
            "extreme" => Ok(Self::Extreme),
            other => Err(SearchError::InvalidConfig(format!(
                "unknown aggressiveness '{other}' (expected normal, aggressive or extreme)"
            ))),
        }
    }
}

/// Scrolling parameters, snapshotted when a run starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Consecutive stagnant cycles tolerated before giving up.
    pub max_retries: u32,
    /// Content settle wait after each scroll, in milliseconds.
    pub inter_cycle_delay_ms: u64,
    pub aggressiveness: Aggressiveness,
    /// Extra distance pushed past the bottom, in pixels.
    pub extra_scroll_px: u32,
}

impl ScrollConfig {
    pub const MAX_RETRIES_RANGE: (u32, u32) = (1, 50);
    pub const DELAY_MS_RANGE: (u64, u64) = (500, 10_000);
    pub const EXTRA_SCROLL_RANGE: (u32, u32) = (0, 10_000);

    /// Reject values outside the ranges the panel allows.
    pub fn validate(&self) -> Result<()> {
        let (lo, hi) = Self::MAX_RETRIES_RANGE;
        if !(lo..=hi).contains(&self.max_retries) {
            return Err(SearchError::InvalidConfig(format!(
                "max_retries {} is outside {lo}-{hi}",
                self.max_retries
            )));
        }
        let (lo, hi) = Self::DELAY_MS_RANGE;
        if !(lo..=hi).contains(&self.inter_cycle_delay_ms) {
            return Err(SearchError::InvalidConfig(format!(
                "inter_cycle_delay_ms {} is outside {lo}-{hi}",
                self.inter_cycle_delay_ms
            )));
        }
        let (lo, hi) = Self::EXTRA_SCROLL_RANGE;
        if !(lo..=hi).contains(&self.extra_scroll_px) {
            return Err(SearchError::InvalidConfig(format!(
                "extra_scroll_px {} is outside {lo}-{hi}",
                self.extra_scroll_px
            )));
        }
        Ok(())
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            max_retries: 10,
            inter_cycle_delay_ms: 2000,
            aggressiveness: Aggressiveness::Aggressive,
            extra_scroll_px: 2000,
        }
    }
}

/// Errors that can occur while driving a search.
#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    #[error("A search is already running")]
    AlreadyRunning,

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Host error: {0}")]
    Host(String),

    #[error("Invalid selector: {0}")]
    Selector(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, SearchError>;
