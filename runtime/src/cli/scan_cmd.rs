//! `dynjump scan <file>`: run one scan over a saved feed page.

use crate::cli::output::{self, Styled};
use anyhow::{Context, Result};
use dynjump::{
    parse_feed_html, scan, FeedSelectors, FeedSnapshotReader, ScanResult, TargetSpec,
};
use std::path::Path;

/// Result of scanning a saved page.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScanReport {
    pub items: usize,
    pub dated: usize,
    pub result: ScanResult,
}

/// Parse `html` and scan its last `window` items for `target`.
pub fn scan_html(html: &str, target: &TargetSpec, window: usize) -> Result<ScanReport> {
    let raw = parse_feed_html(html, &FeedSelectors::default())?;
    let items = FeedSnapshotReader::default().date_items(&raw);
    let dated = items.iter().filter(|i| i.date.is_some()).count();
    Ok(ScanReport {
        items: items.len(),
        dated,
        result: scan(&items, target, window),
    })
}

/// Run the scan command.
pub async fn run(
    file: &Path,
    year: i32,
    month: u32,
    day: Option<u32>,
    window: usize,
) -> Result<()> {
    let target = TargetSpec::new(year, month, day)?;
    let html = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let report = scan_html(&html, &target, window)?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "file": file.display().to_string(),
            "target": target.to_string(),
            "items": report.items,
            "dated": report.dated,
            "result": serde_json::to_value(&report.result)?,
        }));
        return Ok(());
    }

    if output::is_quiet() {
        return Ok(());
    }

    let s = Styled::new();
    println!("  {} feed items, {} with a readable date", report.items, report.dated);
    match &report.result {
        ScanResult::Found { index, date } => {
            println!("  {} {target} found at item {index} ({date})", s.ok_sym());
        }
        ScanResult::Overshoot { passed_date } => {
            println!(
                "  {} already past {target}: oldest item in the window is {passed_date}",
                s.warn_sym()
            );
        }
        ScanResult::Continue { latest } => {
            let latest = latest
                .as_ref()
                .map(|d| d.to_string())
                .unwrap_or_else(|| "no readable date".to_string());
            println!(
                "  {} {target} not loaded yet; newest item in the window: {latest}",
                s.warn_sym()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynjump::DEFAULT_WINDOW;

    const PAGE: &str = r#"<div>
        <div class="bili-dyn-item"><div class="bili-dyn-time">2023-05-01</div></div>
        <div class="bili-dyn-item"><div class="bili-dyn-time">2023-03-20</div></div>
        <div class="bili-dyn-item"><div class="bili-dyn-title">untimed</div></div>
    </div>"#;

    #[test]
    fn test_scan_html_finds_target() {
        let target = TargetSpec::new(2023, 3, None).unwrap();
        let report = scan_html(PAGE, &target, DEFAULT_WINDOW).unwrap();
        assert_eq!(report.items, 3);
        assert_eq!(report.dated, 2);
        assert!(matches!(report.result, ScanResult::Found { index: 1, .. }));
    }

    #[test]
    fn test_scan_html_without_items() {
        let target = TargetSpec::new(2023, 3, None).unwrap();
        let report = scan_html("<p>nothing</p>", &target, DEFAULT_WINDOW).unwrap();
        assert_eq!(report.items, 0);
        assert_eq!(report.result, ScanResult::Continue { latest: None });
    }
}
