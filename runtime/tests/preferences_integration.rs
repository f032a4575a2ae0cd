//! Preference file persistence.

use dynjump_runtime::dynjump::{Aggressiveness, ScrollConfig};
use dynjump_runtime::preferences::{set_value, Preferences, SCROLL_CONFIG_KEY};
use tempfile::TempDir;

fn prefs_in(dir: &TempDir) -> Preferences {
    Preferences::new(dir.path().join("nested").join("preferences.json"))
}

#[test]
fn test_missing_file_loads_defaults() {
    let dir = TempDir::new().unwrap();
    let prefs = prefs_in(&dir);
    assert_eq!(prefs.load_scroll_config(), ScrollConfig::default());
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let prefs = prefs_in(&dir);

    let mut config = ScrollConfig::default();
    set_value(&mut config, "max_retries", "30").unwrap();
    set_value(&mut config, "aggressiveness", "extreme").unwrap();
    prefs.save_scroll_config(&config).unwrap();

    let loaded = prefs_in(&dir).load_scroll_config();
    assert_eq!(loaded.max_retries, 30);
    assert_eq!(loaded.aggressiveness, Aggressiveness::Extreme);
    assert_eq!(loaded.inter_cycle_delay_ms, 2000);

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(prefs.path()).unwrap()).unwrap();
    assert_eq!(raw[SCROLL_CONFIG_KEY]["aggressiveness"], "extreme");
}

#[test]
fn test_unrelated_keys_survive_save_and_reset() {
    let dir = TempDir::new().unwrap();
    let prefs = prefs_in(&dir);
    std::fs::create_dir_all(prefs.path().parent().unwrap()).unwrap();
    std::fs::write(prefs.path(), r#"{"other.tool": {"theme": "dark"}}"#).unwrap();

    prefs.save_scroll_config(&ScrollConfig::default()).unwrap();
    prefs.reset().unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(prefs.path()).unwrap()).unwrap();
    assert_eq!(raw["other.tool"]["theme"], "dark");
    assert!(raw.get(SCROLL_CONFIG_KEY).is_none());
}

#[test]
fn test_corrupt_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let prefs = prefs_in(&dir);
    std::fs::create_dir_all(prefs.path().parent().unwrap()).unwrap();
    std::fs::write(prefs.path(), "{not json").unwrap();
    assert_eq!(prefs.load_scroll_config(), ScrollConfig::default());

    // Saving over a corrupt file replaces it.
    let config = ScrollConfig {
        extra_scroll_px: 4000,
        ..ScrollConfig::default()
    };
    prefs.save_scroll_config(&config).unwrap();
    assert_eq!(prefs.load_scroll_config().extra_scroll_px, 4000);
}

#[test]
fn test_out_of_range_stored_values_are_ignored() {
    let dir = TempDir::new().unwrap();
    let prefs = prefs_in(&dir);
    std::fs::create_dir_all(prefs.path().parent().unwrap()).unwrap();
    std::fs::write(
        prefs.path(),
        format!(r#"{{"{SCROLL_CONFIG_KEY}": {{"max_retries": 500}}}}"#),
    )
    .unwrap();
    assert_eq!(prefs.load_scroll_config(), ScrollConfig::default());
}

#[test]
fn test_partial_stored_config_uses_defaults_for_the_rest() {
    let dir = TempDir::new().unwrap();
    let prefs = prefs_in(&dir);
    std::fs::create_dir_all(prefs.path().parent().unwrap()).unwrap();
    std::fs::write(
        prefs.path(),
        format!(r#"{{"{SCROLL_CONFIG_KEY}": {{"max_retries": 12}}}}"#),
    )
    .unwrap();
    let loaded = prefs.load_scroll_config();
    assert_eq!(loaded.max_retries, 12);
    assert_eq!(loaded.extra_scroll_px, 2000);
}

#[test]
fn test_reset_without_file_is_ok() {
    let dir = TempDir::new().unwrap();
    assert!(prefs_in(&dir).reset().is_ok());
}

#[test]
fn test_invalid_config_is_not_saved() {
    let dir = TempDir::new().unwrap();
    let prefs = prefs_in(&dir);
    let config = ScrollConfig {
        inter_cycle_delay_ms: 50,
        ..ScrollConfig::default()
    };
    assert!(prefs.save_scroll_config(&config).is_err());
    assert!(!prefs.path().exists());
}
