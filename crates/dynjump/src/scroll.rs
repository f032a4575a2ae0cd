//! Scroll commands that provoke the host's lazy loader.

use std::time::Duration;

use crate::snapshot::FeedDocument;
use crate::types::{Aggressiveness, Result, ScrollConfig};

/// Pause before the aggressive mode's extra push.
pub const AGGRESSIVE_PAUSE: Duration = Duration::from_millis(300);
/// Pause between the extreme mode's three scrolls.
pub const EXTREME_PAUSE: Duration = Duration::from_millis(200);
/// Oversized overscroll of the extreme mode's final scroll.
pub const EXTREME_OVERSCROLL_PX: i64 = 5000;

/// Issues scroll commands for one load attempt. Never inspects content.
#[derive(Debug, Clone, Copy)]
pub struct ScrollDriver {
    aggressiveness: Aggressiveness,
    extra_scroll_px: i64,
}

impl ScrollDriver {
    pub fn new(aggressiveness: Aggressiveness, extra_scroll_px: u32) -> Self {
        Self {
            aggressiveness,
            extra_scroll_px: i64::from(extra_scroll_px),
        }
    }

    pub fn from_config(config: &ScrollConfig) -> Self {
        Self::new(config.aggressiveness, config.extra_scroll_px)
    }

    /// Scroll `document` according to the configured policy.
    ///
    /// `cancelled` is polled before each delayed follow-up scroll so a stop
    /// request drops the remaining commands of this attempt.
    pub async fn drive<F>(&self, document: &dyn FeedDocument, cancelled: F) -> Result<()>
    where
        F: Fn() -> bool,
    {
        let extra = self.extra_scroll_px;
        match self.aggressiveness {
            Aggressiveness::Normal => {
                let bottom = document.scroll_height().await?;
                document.scroll_to(bottom).await?;
                tracing::debug!(bottom, "normal scroll");
            }
            Aggressiveness::Aggressive => {
                let bottom = document.scroll_height().await?;
                document.scroll_to(bottom).await?;
                tokio::time::sleep(AGGRESSIVE_PAUSE).await;
                if cancelled() {
                    return Ok(());
                }
                document.scroll_by(extra).await?;
                tracing::debug!(bottom, extra, "aggressive scroll");
            }
            Aggressiveness::Extreme => {
                let bottom = document.scroll_height().await?;
                document.scroll_to(bottom + extra).await?;
                tokio::time::sleep(EXTREME_PAUSE).await;
                if cancelled() {
                    return Ok(());
                }
                document.scroll_by(extra).await?;
                tokio::time::sleep(EXTREME_PAUSE).await;
                if cancelled() {
                    return Ok(());
                }
                let bottom = document.scroll_height().await?;
                document.scroll_to(bottom + EXTREME_OVERSCROLL_PX).await?;
                tracing::debug!(bottom, extra, "extreme scroll");
            }
        }
        Ok(())
    }
}
