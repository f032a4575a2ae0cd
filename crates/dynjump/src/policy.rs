//! Content scan over the most recently loaded window of items.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::{FeedItem, ParsedDate, TargetSpec};

/// Number of most recently loaded items inspected per cycle.
pub const DEFAULT_WINDOW: usize = 20;

/// Result of scanning one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanResult {
    /// An item inside the target period.
    Found { index: usize, date: ParsedDate },
    /// The oldest dated item in the window is already before the target.
    Overshoot { passed_date: ParsedDate },
    /// Keep loading; `latest` is the newest dated item in the window.
    Continue { latest: Option<ParsedDate> },
}

/// Scan the last `window` items for the target.
///
/// Items are visited from the highest index (most recently appended) down to
/// the start of the window and the first match wins. Overshoot is decided
/// only after the whole window was checked, and only from its oldest date,
/// so a target sitting further down the same window is never reported as
/// passed. Items without a date are skipped.
pub fn scan(items: &[FeedItem], target: &TargetSpec, window: usize) -> ScanResult {
    let start = items.len().saturating_sub(window);
    let mut latest: Option<&ParsedDate> = None;
    let mut oldest: Option<&ParsedDate> = None;

    for item in items[start..].iter().rev() {
        let Some(date) = item.date.as_ref() else {
            continue;
        };

        if latest.map_or(true, |l| date.epoch_seconds > l.epoch_seconds) {
            latest = Some(date);
        }
        if oldest.map_or(true, |o| date.epoch_seconds < o.epoch_seconds) {
            oldest = Some(date);
        }

        if target.matches(date) {
            tracing::debug!(index = item.index, date = %date, "target matched");
            return ScanResult::Found {
                index: item.index,
                date: date.clone(),
            };
        }
    }

    match oldest {
        Some(o) if target.compare(o) == Ordering::Less => ScanResult::Overshoot {
            passed_date: o.clone(),
        },
        _ => ScanResult::Continue {
            latest: latest.cloned(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dated(index: usize, y: i32, m: u32, d: u32) -> FeedItem {
        let epoch = NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp();
        FeedItem {
            index,
            date: Some(ParsedDate {
                year: y,
                month: m,
                day: d,
                epoch_seconds: epoch,
                original_text: format!("{y}-{m:02}-{d:02}"),
            }),
        }
    }

    fn undated(index: usize) -> FeedItem {
        FeedItem { index, date: None }
    }

    /// Newest first, as the host renders them.
    fn feed(dates: &[(i32, u32, u32)]) -> Vec<FeedItem> {
        dates
            .iter()
            .enumerate()
            .map(|(i, &(y, m, d))| dated(i, y, m, d))
            .collect()
    }

    #[test]
    fn test_found_month_target() {
        let items = feed(&[
            (2023, 5, 1),
            (2023, 4, 10),
            (2023, 3, 20),
            (2023, 2, 14),
            (2023, 1, 1),
        ]);
        let target = TargetSpec::new(2023, 3, None).unwrap();
        match scan(&items, &target, DEFAULT_WINDOW) {
            ScanResult::Found { index, date } => {
                assert_eq!(index, 2);
                assert_eq!((date.year, date.month, date.day), (2023, 3, 20));
            }
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[test]
    fn test_found_returns_first_match_in_scan_order() {
        // Two March items; the scan starts at the highest index.
        let items = feed(&[(2023, 4, 1), (2023, 3, 30), (2023, 3, 2), (2023, 2, 1)]);
        let target = TargetSpec::new(2023, 3, None).unwrap();
        assert!(matches!(
            scan(&items, &target, DEFAULT_WINDOW),
            ScanResult::Found { index: 2, .. }
        ));
    }

    #[test]
    fn test_day_target_requires_exact_day() {
        let items = feed(&[(2023, 3, 21), (2023, 3, 20), (2023, 3, 19)]);
        let hit = TargetSpec::new(2023, 3, Some(20)).unwrap();
        assert!(matches!(
            scan(&items, &hit, DEFAULT_WINDOW),
            ScanResult::Found { index: 1, .. }
        ));

        let items = feed(&[(2023, 3, 21), (2023, 3, 19)]);
        match scan(&items, &hit, DEFAULT_WINDOW) {
            ScanResult::Overshoot { passed_date } => assert_eq!(passed_date.day, 19),
            other => panic!("expected Overshoot, got {other:?}"),
        }
    }

    #[test]
    fn test_overshoot_reports_oldest_date() {
        let items = feed(&[(2020, 3, 1), (2020, 2, 5), (2019, 12, 1)]);
        let target = TargetSpec::new(2020, 1, None).unwrap();
        match scan(&items, &target, DEFAULT_WINDOW) {
            ScanResult::Overshoot { passed_date } => {
                assert_eq!(
                    (passed_date.year, passed_date.month, passed_date.day),
                    (2019, 12, 1)
                );
            }
            other => panic!("expected Overshoot, got {other:?}"),
        }
    }

    #[test]
    fn test_window_entirely_older_than_target() {
        let items = feed(&[(2019, 12, 20), (2019, 12, 1)]);
        let target = TargetSpec::new(2020, 1, None).unwrap();
        assert!(matches!(
            scan(&items, &target, DEFAULT_WINDOW),
            ScanResult::Overshoot { .. }
        ));
    }

    #[test]
    fn test_continue_reports_latest_in_window() {
        let items = feed(&[(2024, 6, 1), (2024, 5, 12), (2024, 4, 3)]);
        let target = TargetSpec::new(2023, 3, None).unwrap();
        match scan(&items, &target, DEFAULT_WINDOW) {
            ScanResult::Continue { latest: Some(d) } => assert_eq!((d.year, d.month), (2024, 6)),
            other => panic!("expected Continue, got {other:?}"),
        }
    }

    #[test]
    fn test_only_the_window_is_inspected() {
        // The March item sits outside a 2-item window.
        let items = feed(&[(2023, 3, 9), (2023, 5, 2), (2023, 4, 28)]);
        let target = TargetSpec::new(2023, 3, None).unwrap();
        match scan(&items, &target, 2) {
            ScanResult::Continue { latest: Some(d) } => assert_eq!((d.month, d.day), (5, 2)),
            other => panic!("expected Continue, got {other:?}"),
        }
    }

    #[test]
    fn test_undated_items_are_skipped() {
        let items = vec![undated(0), undated(1)];
        let target = TargetSpec::new(2023, 3, None).unwrap();
        assert_eq!(
            scan(&items, &target, DEFAULT_WINDOW),
            ScanResult::Continue { latest: None }
        );

        let mut items = feed(&[(2023, 4, 2)]);
        items.push(undated(1));
        items.push(dated(2, 2023, 3, 15));
        items.push(undated(3));
        assert!(matches!(
            scan(&items, &target, DEFAULT_WINDOW),
            ScanResult::Found { index: 2, .. }
        ));
    }

    #[test]
    fn test_empty_feed() {
        let target = TargetSpec::new(2023, 3, None).unwrap();
        assert_eq!(
            scan(&[], &target, DEFAULT_WINDOW),
            ScanResult::Continue { latest: None }
        );
    }

    #[test]
    fn test_scan_is_idempotent() {
        let items = feed(&[(2023, 6, 1), (2023, 5, 2), (2023, 1, 3)]);
        let target = TargetSpec::new(2023, 3, None).unwrap();
        let first = scan(&items, &target, DEFAULT_WINDOW);
        let second = scan(&items, &target, DEFAULT_WINDOW);
        assert_eq!(first, second);
        assert!(matches!(first, ScanResult::Overshoot { .. }));
    }
}
