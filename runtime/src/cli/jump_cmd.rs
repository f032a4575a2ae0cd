//! `dynjump jump <url>`: open a feed in Chromium and scroll to a period.

use crate::cli::output::{self, Styled};
use crate::page_feed::PageFeed;
use crate::preferences::Preferences;
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::Renderer;
use anyhow::{Context, Result};
use dynjump::events::{self, ProgressEventKind, ProgressReceiver};
use dynjump::{
    Aggressiveness, FeedSelectors, FeedSnapshotReader, ScrollConfig, SearchController,
    SearchOutcome, TargetSpec,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Options of one `jump` invocation.
#[derive(Debug, Clone)]
pub struct JumpOptions {
    pub url: String,
    pub year: i32,
    pub month: u32,
    pub day: Option<u32>,
    pub max_retries: Option<u32>,
    pub delay_ms: Option<u64>,
    pub aggressiveness: Option<Aggressiveness>,
    pub extra_scroll: Option<u32>,
    pub headful: bool,
    pub nav_timeout_ms: u64,
    pub prefs: Option<PathBuf>,
}

impl JumpOptions {
    fn has_overrides(&self) -> bool {
        self.max_retries.is_some()
            || self.delay_ms.is_some()
            || self.aggressiveness.is_some()
            || self.extra_scroll.is_some()
    }

    /// Layer the command-line values over the stored config.
    pub fn apply_to(&self, config: &mut ScrollConfig) {
        if let Some(v) = self.max_retries {
            config.max_retries = v;
        }
        if let Some(v) = self.delay_ms {
            config.inter_cycle_delay_ms = v;
        }
        if let Some(v) = self.aggressiveness {
            config.aggressiveness = v;
        }
        if let Some(v) = self.extra_scroll {
            config.extra_scroll_px = v;
        }
    }
}

/// Run the jump command.
pub async fn run(opts: JumpOptions) -> Result<()> {
    let target = TargetSpec::new(opts.year, opts.month, opts.day)?;

    let prefs = Preferences::resolve(opts.prefs.as_deref());
    let mut config = prefs.load_scroll_config();
    if opts.has_overrides() {
        opts.apply_to(&mut config);
        config.validate()?;
        if let Err(e) = prefs.save_scroll_config(&config) {
            warn!("could not save preferences: {e:#}");
        }
    }

    let renderer = ChromiumRenderer::new(opts.headful).await?;
    let mut ctx = renderer.new_context().await?;
    let nav = ctx
        .navigate(&opts.url, opts.nav_timeout_ms)
        .await
        .with_context(|| format!("failed to open {}", opts.url))?;
    info!(url = %nav.final_url, load_ms = nav.load_time_ms, "feed page loaded");

    let feed = Arc::new(PageFeed::new(ctx, FeedSelectors::default()));
    let (tx, rx) = events::channel();
    let controller =
        SearchController::new(feed.clone(), FeedSnapshotReader::default()).with_progress(tx);

    let spinner = if output::is_quiet() {
        None
    } else {
        Some(tokio::spawn(render_progress(rx)?))
    };

    let stop = controller.stop_handle();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.stop();
        }
    });

    let result = controller.run(target, &config).await;
    ctrl_c.abort();
    drop(controller);
    if let Some(spinner) = spinner {
        let _ = spinner.await;
    }
    let outcome = result?;

    report(&target, &config, &outcome)?;

    if opts.headful && outcome.is_found() && !output::is_json() {
        eprintln!("  Browser left open on the found post. Press Ctrl-C to close it.");
        let _ = tokio::signal::ctrl_c().await;
    }

    if let Ok(feed) = Arc::try_unwrap(feed) {
        feed.into_context().close().await?;
    }
    renderer.shutdown().await?;
    Ok(())
}

/// Drive a spinner from the progress feed until the channel closes.
fn render_progress(
    mut rx: ProgressReceiver,
) -> Result<impl std::future::Future<Output = ()> + Send + 'static> {
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template("  {spinner} {msg}")?);
    bar.enable_steady_tick(Duration::from_millis(120));

    Ok(async move {
        loop {
            match rx.recv().await {
                Ok(event) => match event.event {
                    ProgressEventKind::Started { target, max_retries } => {
                        bar.set_message(format!("searching for {target} (max retries {max_retries})"));
                    }
                    ProgressEventKind::Cycle(progress) => {
                        bar.set_message(format!(
                            "{} | loaded {} | scrolls {} | retries {}/{} | {}",
                            progress.current_date.as_deref().unwrap_or("-"),
                            progress.loaded_count,
                            progress.scroll_count,
                            progress.retry_count,
                            progress.max_retries,
                            progress.status,
                        ));
                    }
                    ProgressEventKind::Finished { .. } => bar.finish_and_clear(),
                },
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
        bar.finish_and_clear();
    })
}

fn report(target: &TargetSpec, config: &ScrollConfig, outcome: &SearchOutcome) -> Result<()> {
    if output::is_json() {
        output::print_json(&serde_json::json!({
            "target": target.to_string(),
            "config": serde_json::to_value(config)?,
            "outcome": serde_json::to_value(outcome)?,
            "summary": outcome.summary(target),
        }));
        return Ok(());
    }

    if !output::is_quiet() {
        let s = Styled::new();
        let sym = if outcome.is_found() {
            s.ok_sym()
        } else {
            s.warn_sym()
        };
        eprintln!();
        for (i, line) in outcome.summary(target).lines().enumerate() {
            if i == 0 {
                eprintln!("  {sym} {}", s.bold(line));
            } else {
                eprintln!("    {line}");
            }
        }
    }

    if let SearchOutcome::Found { index, date, .. } = outcome {
        println!("{index}\t{date}");
    }
    Ok(())
}
