//! Persisted scroll preferences.
//!
//! The last-used [`ScrollConfig`] lives in a small JSON object under the
//! `dynjump.scroll_config` key. Other keys in the same file are preserved.

use anyhow::{bail, Context, Result};
use dynjump::{Aggressiveness, ScrollConfig};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable that overrides the preferences file.
pub const PREFS_ENV: &str = "DYNJUMP_PREFS";
/// Key the scroll config is stored under.
pub const SCROLL_CONFIG_KEY: &str = "dynjump.scroll_config";
const UPDATED_AT_KEY: &str = "dynjump.updated_at";

/// Keys accepted by `dynjump config set`.
pub const SETTABLE_KEYS: &[&str] = &["max_retries", "delay_ms", "aggressiveness", "extra_scroll"];

/// Resolve the preferences path: explicit, then env, then home dir.
pub fn resolve_prefs_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    if let Ok(env_path) = std::env::var(PREFS_ENV) {
        if !env_path.is_empty() {
            return PathBuf::from(env_path);
        }
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".dynjump")
        .join("preferences.json")
}

/// Handle on the preferences file.
#[derive(Debug, Clone)]
pub struct Preferences {
    path: PathBuf,
}

impl Preferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open the file [`resolve_prefs_path`] picks.
    pub fn resolve(explicit: Option<&Path>) -> Self {
        Self::new(resolve_prefs_path(explicit))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored config, or defaults when the file is missing, unreadable or
    /// holds out-of-range values.
    pub fn load_scroll_config(&self) -> ScrollConfig {
        let entries = match self.read_entries() {
            Ok(Some(entries)) => entries,
            Ok(None) => {
                debug!(path = %self.path.display(), "no preferences file, using defaults");
                return ScrollConfig::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), "ignoring preferences: {e:#}");
                return ScrollConfig::default();
            }
        };

        let Some(value) = entries.get(SCROLL_CONFIG_KEY) else {
            return ScrollConfig::default();
        };
        let config = match serde_json::from_value::<ScrollConfig>(value.clone()) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %self.path.display(), "ignoring stored scroll config: {e}");
                return ScrollConfig::default();
            }
        };
        match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!(path = %self.path.display(), "ignoring stored scroll config: {e}");
                ScrollConfig::default()
            }
        }
    }

    /// Store `config`, keeping any unrelated keys already in the file.
    pub fn save_scroll_config(&self, config: &ScrollConfig) -> Result<()> {
        config.validate()?;
        let mut entries = self.read_entries().ok().flatten().unwrap_or_default();
        entries.insert(SCROLL_CONFIG_KEY.to_string(), serde_json::to_value(config)?);
        entries.insert(
            UPDATED_AT_KEY.to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
        self.write_entries(&entries)
    }

    /// Drop the stored config so the next load returns defaults.
    pub fn reset(&self) -> Result<()> {
        let Some(mut entries) = self.read_entries().ok().flatten() else {
            return Ok(());
        };
        entries.remove(SCROLL_CONFIG_KEY);
        entries.remove(UPDATED_AT_KEY);
        self.write_entries(&entries)
    }

    fn read_entries(&self) -> Result<Option<Map<String, Value>>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", self.path.display()))
            }
        };
        let entries = serde_json::from_str(&text)
            .with_context(|| format!("{} is not a JSON object", self.path.display()))?;
        Ok(Some(entries))
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        debug!(path = %self.path.display(), "preferences saved");
        Ok(())
    }
}

/// Apply one `key = value` edit to `config`, rejecting out-of-range values.
pub fn set_value(config: &mut ScrollConfig, key: &str, value: &str) -> Result<()> {
    let mut updated = config.clone();
    match key {
        "max_retries" => {
            updated.max_retries = value
                .parse()
                .with_context(|| format!("max_retries must be a whole number, got '{value}'"))?;
        }
        "delay_ms" | "inter_cycle_delay_ms" => {
            updated.inter_cycle_delay_ms = value
                .parse()
                .with_context(|| format!("delay_ms must be a whole number, got '{value}'"))?;
        }
        "aggressiveness" => {
            updated.aggressiveness = value.parse::<Aggressiveness>()?;
        }
        "extra_scroll" | "extra_scroll_px" => {
            updated.extra_scroll_px = value
                .parse()
                .with_context(|| format!("extra_scroll must be a whole number, got '{value}'"))?;
        }
        other => bail!(
            "unknown key '{other}' (expected one of: {})",
            SETTABLE_KEYS.join(", ")
        ),
    }
    updated.validate()?;
    *config = updated;
    Ok(())
}
