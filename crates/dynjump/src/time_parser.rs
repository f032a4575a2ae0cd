//! Normalizes the feed's human-readable timestamp labels to calendar dates.
//!
//! Recognized forms, tried in this order:
//!
//! 1. `YYYY-MM-DD` / `YYYY年MM月DD日`: exact date.
//! 2. `MM-DD` / `MM月DD日`: year inferred from "now" (see below).
//! 3. `N分钟前` / `N minutes ago`.
//! 4. `N小时前` / `N hours ago`.
//! 5. `昨天` / `yesterday`: now minus 24h.
//! 6. `前天` / `day before yesterday`: now minus 48h.
//! 7. `刚刚` / `just now`: now.
//!
//! Every call is evaluated against the clock at the moment of the call, so a
//! result is never reused once "now" has moved on.
//!
//! ## Year inference for partial dates
//!
//! The host omits the year for recent posts. A partial date whose month is
//! later than the current month is assumed to belong to the previous year,
//! otherwise to the current year. This is a heuristic: a label like `12-31`
//! read in early January maps to last year (right), but a label dated later
//! in the current month maps to the current year even if it is actually a
//! year old. The mapping is kept as-is.

use std::sync::OnceLock;

use chrono::{DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, TimeZone, Utc};
use regex::Regex;

use crate::types::ParsedDate;

struct Patterns {
    absolute: Regex,
    partial: Regex,
    minutes: Regex,
    hours: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        absolute: Regex::new(r"(\d{4})[-年](\d{1,2})[-月](\d{1,2})")
            .expect("absolute date regex is valid"),
        partial: Regex::new(r"(\d{1,2})[-月](\d{1,2})").expect("partial date regex is valid"),
        minutes: Regex::new(r"(?i)(\d+)\s*(?:分钟前|minutes? ago|mins? ago)")
            .expect("minutes regex is valid"),
        hours: Regex::new(r"(?i)(\d+)\s*(?:小时前|hours? ago|hrs? ago)")
            .expect("hours regex is valid"),
    })
}

/// Converts timestamp labels to [`ParsedDate`]s in a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct TimeParser {
    offset: FixedOffset,
}

impl TimeParser {
    /// Parser whose calendar fields are computed in `offset`.
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Parser using the machine's current local offset.
    pub fn local() -> Self {
        Self::new(*Local::now().offset())
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Parse `text` against the current wall clock.
    pub fn parse(&self, text: &str) -> Option<ParsedDate> {
        self.parse_at(text, Utc::now())
    }

    /// Parse `text` as if the current instant were `now`.
    ///
    /// Returns `None` when nothing is recognized; callers treat that as an
    /// item without a date, never as an error.
    pub fn parse_at(&self, text: &str, now: DateTime<Utc>) -> Option<ParsedDate> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let p = patterns();

        if let Some(caps) = p.absolute.captures(text) {
            let year = caps[1].parse().ok()?;
            let month = caps[2].parse().ok()?;
            let day = caps[3].parse().ok()?;
            return self.calendar_date(year, month, day, text);
        }

        if let Some(caps) = p.partial.captures(text) {
            let month: u32 = caps[1].parse().ok()?;
            let day = caps[2].parse().ok()?;
            let today = now.with_timezone(&self.offset);
            let mut year = today.year();
            if month > today.month() {
                year -= 1;
            }
            return self.calendar_date(year, month, day, text);
        }

        if let Some(caps) = p.minutes.captures(text) {
            let minutes = caps[1].parse().ok()?;
            return self.instant(now, Duration::try_minutes(minutes)?, text);
        }

        if let Some(caps) = p.hours.captures(text) {
            let hours = caps[1].parse().ok()?;
            return self.instant(now, Duration::try_hours(hours)?, text);
        }

        let lower = text.to_lowercase();
        // "day before yesterday" contains "yesterday", so it goes first.
        if text.contains("前天") || lower.contains("day before yesterday") {
            return self.instant(now, Duration::seconds(172_800), text);
        }
        if text.contains("昨天") || lower.contains("yesterday") {
            return self.instant(now, Duration::seconds(86_400), text);
        }
        if text.contains("刚刚") || lower.contains("just now") {
            return self.instant(now, Duration::zero(), text);
        }

        None
    }

    fn calendar_date(&self, year: i32, month: u32, day: u32, text: &str) -> Option<ParsedDate> {
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let midnight = self
            .offset
            .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
            .single()?;
        Some(ParsedDate {
            year,
            month,
            day,
            epoch_seconds: midnight.timestamp(),
            original_text: text.to_string(),
        })
    }

    fn instant(&self, now: DateTime<Utc>, ago: Duration, text: &str) -> Option<ParsedDate> {
        let at = now.checked_sub_signed(ago)?.with_timezone(&self.offset);
        Some(ParsedDate {
            year: at.year(),
            month: at.month(),
            day: at.day(),
            epoch_seconds: at.timestamp(),
            original_text: text.to_string(),
        })
    }
}

impl Default for TimeParser {
    fn default() -> Self {
        Self::local()
    }
}
