//! `dynjump config`: show and edit the stored scroll preferences.

use crate::cli::output::{self, Styled};
use crate::preferences::{self, Preferences};
use anyhow::Result;
use dynjump::ScrollConfig;
use std::path::Path;

fn print_config(prefs: &Preferences, config: &ScrollConfig) -> Result<()> {
    if output::is_json() {
        output::print_json(&serde_json::json!({
            "path": prefs.path().display().to_string(),
            "config": serde_json::to_value(config)?,
        }));
        return Ok(());
    }
    if !output::is_quiet() {
        println!("  Preferences: {}", prefs.path().display());
        println!("    max_retries     {}", config.max_retries);
        println!("    delay_ms        {}", config.inter_cycle_delay_ms);
        println!("    aggressiveness  {}", config.aggressiveness);
        println!("    extra_scroll    {}", config.extra_scroll_px);
    }
    Ok(())
}

/// Print the stored config (defaults when nothing is stored).
pub async fn run_show(prefs_path: Option<&Path>) -> Result<()> {
    let prefs = Preferences::resolve(prefs_path);
    let config = prefs.load_scroll_config();
    print_config(&prefs, &config)
}

/// Change one value and persist it.
pub async fn run_set(prefs_path: Option<&Path>, key: &str, value: &str) -> Result<()> {
    let prefs = Preferences::resolve(prefs_path);
    let mut config = prefs.load_scroll_config();
    preferences::set_value(&mut config, key, value)?;
    prefs.save_scroll_config(&config)?;
    if !output::is_quiet() {
        eprintln!("  {} {key} = {value}", Styled::new().ok_sym());
    }
    print_config(&prefs, &config)
}

/// Forget the stored config.
pub async fn run_reset(prefs_path: Option<&Path>) -> Result<()> {
    let prefs = Preferences::resolve(prefs_path);
    prefs.reset()?;
    if !output::is_quiet() {
        eprintln!("  {} Preferences reset to defaults.", Styled::new().ok_sym());
    }
    print_config(&prefs, &ScrollConfig::default())
}
