// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tempfile::TempDir;

#[test]
fn test_init_and_load_config() {
    let temp = TempDir::new().unwrap();
    let work_dir = init_work_dir(temp.path(), None).unwrap();

    let config = Config::load(&work_dir).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(get_db_path(&work_dir, &config), work_dir.join("offsync.db"));
}

#[test]
fn test_init_with_custom_store() {
    let temp = TempDir::new().unwrap();
    let work_dir = init_work_dir(temp.path(), Some("/var/lib/app.db")).unwrap();

    let config = Config::load(&work_dir).unwrap();
    assert_eq!(get_db_path(&work_dir, &config), PathBuf::from("/var/lib/app.db"));
}

#[test]
fn test_already_initialized() {
    let temp = TempDir::new().unwrap();
    init_work_dir(temp.path(), None).unwrap();

    let result = init_work_dir(temp.path(), None);
    assert!(matches!(result, Err(Error::AlreadyInitialized(_))));
}

#[test]
fn test_missing_sections_use_defaults() {
    let config: Config = toml::from_str("[sync]\nmax_attempts = 3\n").unwrap();

    assert_eq!(config.store.path, "offsync.db");
    assert_eq!(config.sync.preflight, "enabled");
    assert_eq!(config.sync.preflight_timeout_ms, 60_000);
    assert_eq!(config.sync.max_attempts, 3);
    assert_eq!(config.http.timeout_secs, 30);
}

#[test]
fn test_sync_options_from_config() {
    let sync = SyncConfig {
        preflight: "disabled".to_string(),
        preflight_timeout_ms: 500,
        max_attempts: 0,
    };

    let options = sync.options().unwrap();
    assert!(matches!(options.preflight, PreflightMode::Disabled));
    assert_eq!(options.preflight_timeout_ms, 500);
    assert_eq!(options.max_attempts, None);

    let limited = SyncConfig {
        max_attempts: 2,
        ..SyncConfig::default()
    };
    assert_eq!(limited.options().unwrap().max_attempts, Some(2));
}

#[test]
fn test_regex_preflight() {
    let sync = SyncConfig {
        preflight: "^https://api\\.".to_string(),
        ..SyncConfig::default()
    };

    let options = sync.options().unwrap();
    assert!(options.preflight.applies_to("https://api.example.com/x"));
    assert!(!options.preflight.applies_to("https://cdn.example.com/x"));
}

#[test]
fn test_invalid_preflight_regex() {
    let sync = SyncConfig {
        preflight: "(".to_string(),
        ..SyncConfig::default()
    };
    assert!(matches!(sync.options(), Err(Error::Config(_))));
}

#[test]
fn test_http_timeout_zero_disables() {
    let http = HttpConfig { timeout_secs: 0 };
    assert_eq!(http.timeout(), None);
    assert_eq!(HttpConfig::default().timeout(), Some(Duration::from_secs(30)));
}

#[test]
fn test_round_trip_preserves_values() {
    let temp = TempDir::new().unwrap();
    let work_dir = init_work_dir(temp.path(), None).unwrap();
    let mut config = Config::load(&work_dir).unwrap();
    config.sync.max_attempts = 5;
    config.save(&work_dir).unwrap();

    assert_eq!(Config::load(&work_dir).unwrap().sync.max_attempts, 5);
}
