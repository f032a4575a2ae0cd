//! Search controller: the state machine that drives a run.
//!
//! ```text
//! Idle --run(target, config)--> Running
//! Running --cycle--> Running | Found | Overshoot | Exhausted | NoContent
//! Running --stop()--> UserStopped
//! any terminal state --> Idle
//! ```
//!
//! A run is one sequential async task: every wait is awaited in order, so a
//! cycle never overlaps the next one and the state it mutates is complete
//! before the following cycle reads it. Cancellation is cooperative and
//! checked at the top of each cycle and after each settle wait.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::detector::{LoadProgress, SearchState};
use crate::events::{self, CycleProgress, ProgressEventKind, ProgressSender};
use crate::outcome::SearchOutcome;
use crate::policy::{self, ScanResult, DEFAULT_WINDOW};
use crate::scroll::ScrollDriver;
use crate::snapshot::{FeedDocument, FeedSnapshotReader};
use crate::types::{Result, ScrollConfig, SearchError, TargetSpec};

/// Small scroll issued on start to trigger the first load.
pub const INITIAL_SCROLL_PX: i64 = 500;
/// Wait after the initial scroll before the first cycle.
pub const START_SETTLE: Duration = Duration::from_millis(1000);
/// Wait after a scroll for the viewport to settle, measured from the first
/// scroll command of the cycle.
pub const SCROLL_SETTLE: Duration = Duration::from_millis(800);
/// Pause between a continuing cycle and the next one.
pub const CYCLE_PACING: Duration = Duration::from_millis(500);

/// Generation value meaning "no run in flight".
const IDLE: u64 = 0;

/// Coarse controller state visible to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Running,
}

/// Cancels the in-flight run from anywhere.
#[derive(Debug, Clone)]
pub struct StopHandle {
    active: Arc<AtomicU64>,
}

impl StopHandle {
    /// Request a stop. The run ends at its next cancellation check.
    pub fn stop(&self) {
        let previous = self.active.swap(IDLE, Ordering::SeqCst);
        if previous != IDLE {
            info!(generation = previous, "stop requested");
        }
    }
}

/// Clears the active generation when a run ends, unless a stop already did.
struct RunGuard<'a> {
    active: &'a AtomicU64,
    generation: u64,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let _ = self.active.compare_exchange(
            self.generation,
            IDLE,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }
}

/// Drives one search at a time against a [`FeedDocument`].
pub struct SearchController {
    document: Arc<dyn FeedDocument>,
    reader: FeedSnapshotReader,
    window: usize,
    progress: Option<ProgressSender>,
    active: Arc<AtomicU64>,
    generations: AtomicU64,
}

impl SearchController {
    pub fn new(document: Arc<dyn FeedDocument>, reader: FeedSnapshotReader) -> Self {
        Self {
            document,
            reader,
            window: DEFAULT_WINDOW,
            progress: None,
            active: Arc::new(AtomicU64::new(IDLE)),
            generations: AtomicU64::new(IDLE),
        }
    }

    /// Publish the progress feed on `tx`.
    pub fn with_progress(mut self, tx: ProgressSender) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Override the scan window size.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window.max(1);
        self
    }

    pub fn state(&self) -> ControllerState {
        if self.active.load(Ordering::SeqCst) == IDLE {
            ControllerState::Idle
        } else {
            ControllerState::Running
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            active: Arc::clone(&self.active),
        }
    }

    /// Cancel the in-flight run, if any, and return to Idle.
    pub fn stop(&self) {
        self.stop_handle().stop();
    }

    /// Run one search to a terminal outcome.
    ///
    /// `config` is copied on entry; later edits by the caller do not affect
    /// the run. Fails with [`SearchError::AlreadyRunning`] while another run
    /// is in flight, and with [`SearchError::Host`] if the document fails.
    pub async fn run(&self, target: TargetSpec, config: &ScrollConfig) -> Result<SearchOutcome> {
        config.validate()?;
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        self.active
            .compare_exchange(IDLE, generation, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| SearchError::AlreadyRunning)?;
        let _guard = RunGuard {
            active: &self.active,
            generation,
        };

        let config = config.clone();
        let mut state = SearchState::new(target, &config);
        let mut seq = 0;
        info!(
            %target,
            max_retries = config.max_retries,
            delay_ms = config.inter_cycle_delay_ms,
            aggressiveness = %config.aggressiveness,
            extra_scroll_px = config.extra_scroll_px,
            "search started"
        );
        events::emit(
            &self.progress,
            &mut seq,
            ProgressEventKind::Started {
                target,
                max_retries: config.max_retries,
            },
        );

        let result = self.run_cycles(&mut state, &config, generation, &mut seq).await;

        match &result {
            Ok(outcome) => {
                info!(
                    outcome = outcome.label(),
                    scrolls = state.scroll_count,
                    loaded = state.last_item_count,
                    "search finished"
                );
                events::emit(
                    &self.progress,
                    &mut seq,
                    ProgressEventKind::Finished {
                        outcome: outcome.label().to_string(),
                        summary: outcome.summary(&target),
                    },
                );
            }
            Err(e) => warn!("search aborted: {e}"),
        }
        result
    }

    async fn run_cycles(
        &self,
        state: &mut SearchState,
        config: &ScrollConfig,
        generation: u64,
        seq: &mut u64,
    ) -> Result<SearchOutcome> {
        let document = self.document.as_ref();
        let driver = ScrollDriver::from_config(config);
        let content_settle = Duration::from_millis(config.inter_cycle_delay_ms);
        let cancelled = || self.active.load(Ordering::SeqCst) != generation;
        let stopped = |state: &SearchState| SearchOutcome::UserStopped {
            loaded_count: state.last_item_count,
            scroll_count: state.scroll_count,
        };

        document.scroll_by(INITIAL_SCROLL_PX).await?;
        sleep(START_SETTLE).await;

        loop {
            if cancelled() {
                return Ok(stopped(state));
            }

            state.scroll_count += 1;
            let scroll_started = Instant::now();
            driver.drive(document, &cancelled).await?;
            sleep_until(scroll_started + SCROLL_SETTLE).await;
            if cancelled() {
                return Ok(stopped(state));
            }
            sleep(content_settle).await;
            if cancelled() {
                return Ok(stopped(state));
            }

            let items = self.reader.snapshot(document).await?;
            let count = items.len();
            let load = state.record_load(count);
            debug!(
                scroll = state.scroll_count,
                count,
                retries = state.retry_count,
                ?load,
                "cycle snapshot"
            );
            let mut status = match load {
                LoadProgress::Progress { added } => format!("loaded {added} new items"),
                LoadProgress::Stagnation { retries } => {
                    format!("no new items, retrying ({retries}/{})", state.max_retries)
                }
            };

            let mut current_date = None;
            let mut terminal = None;
            if count > 0 {
                match policy::scan(&items, &state.target, self.window) {
                    ScanResult::Found { index, date } => {
                        status = format!("found {date}");
                        if let Err(e) = document.highlight(index).await {
                            warn!(index, "failed to highlight found item: {e}");
                        }
                        current_date = Some(date.to_string());
                        terminal = Some(SearchOutcome::Found {
                            index,
                            date,
                            loaded_count: count,
                            scroll_count: state.scroll_count,
                        });
                    }
                    ScanResult::Overshoot { passed_date } => {
                        status = format!("passed the target at {passed_date}");
                        current_date = Some(passed_date.to_string());
                        terminal = Some(SearchOutcome::Overshoot {
                            passed_date,
                            loaded_count: count,
                        });
                    }
                    ScanResult::Continue { latest } => {
                        current_date = latest.map(|d| d.to_string());
                    }
                }
            }

            if terminal.is_none() && state.is_exhausted() {
                terminal = Some(if count == 0 {
                    SearchOutcome::NoContent {
                        max_retries: state.max_retries,
                    }
                } else {
                    SearchOutcome::Exhausted {
                        last_date: items.last().and_then(|item| item.date.clone()),
                        loaded_count: count,
                        max_retries: state.max_retries,
                    }
                });
                status = "retry budget exhausted".to_string();
            }

            events::emit(
                &self.progress,
                seq,
                ProgressEventKind::Cycle(CycleProgress {
                    current_date,
                    loaded_count: count,
                    scroll_count: state.scroll_count,
                    retry_count: state.retry_count,
                    max_retries: state.max_retries,
                    status,
                }),
            );

            if let Some(outcome) = terminal {
                return Ok(outcome);
            }
            sleep(CYCLE_PACING).await;
        }
    }
}
