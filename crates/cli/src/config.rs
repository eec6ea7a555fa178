// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Project configuration management.
//!
//! Configuration is stored in `.offsync/config.toml`:
//! - `[store] path`: the SQLite store, relative to `.offsync/` or absolute
//! - `[sync]`: preflight mode, preflight timeout and the replay attempt limit
//! - `[http] timeout_secs`: overall timeout of each network request

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use offsync_core::{PreflightMode, SyncOptions};

use crate::error::{Error, Result};

const WORK_DIR_NAME: &str = ".offsync";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "offsync.db";

/// Project configuration stored in `.offsync/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> String {
    DB_FILE_NAME.to_string()
}

/// Replay settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// "enabled", "disabled", or a regex selecting the urls to preflight.
    #[serde(default = "default_preflight")]
    pub preflight: String,
    #[serde(default = "default_preflight_timeout_ms")]
    pub preflight_timeout_ms: u64,
    /// Failed attempts before an entry is dropped. 0 keeps it forever.
    #[serde(default)]
    pub max_attempts: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            preflight: default_preflight(),
            preflight_timeout_ms: default_preflight_timeout_ms(),
            max_attempts: 0,
        }
    }
}

fn default_preflight() -> String {
    "enabled".to_string()
}

fn default_preflight_timeout_ms() -> u64 {
    offsync_core::sync::DEFAULT_PREFLIGHT_TIMEOUT_MS
}

impl SyncConfig {
    /// Engine options for this configuration.
    pub fn options(&self) -> Result<SyncOptions> {
        let preflight = PreflightMode::parse(&self.preflight)
            .map_err(|e| Error::Config(format!("invalid sync.preflight: {}", e)))?;
        Ok(SyncOptions {
            preflight,
            preflight_timeout_ms: self.preflight_timeout_ms,
            max_attempts: (self.max_attempts > 0).then_some(self.max_attempts),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

impl HttpConfig {
    /// Request timeout; 0 disables it.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Config {
    /// Load config from the work directory.
    pub fn load(work_dir: &Path) -> Result<Self> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Save config to the work directory.
    pub fn save(&self, work_dir: &Path) -> Result<()> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = self.to_toml()?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))
    }
}

/// Find the .offsync directory by walking up from the current directory
pub fn find_work_dir() -> Result<PathBuf> {
    let mut current = std::env::current_dir()?;
    loop {
        let work_dir = current.join(WORK_DIR_NAME);
        if work_dir.is_dir() {
            return Ok(work_dir);
        }
        if !current.pop() {
            return Err(Error::NotInitialized);
        }
    }
}

/// Get the store path from config
pub fn get_db_path(work_dir: &Path, config: &Config) -> PathBuf {
    let path = Path::new(&config.store.path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        work_dir.join(path)
    }
}

/// Initialize the .offsync directory at the given path
pub fn init_work_dir(path: &Path, store: Option<&str>) -> Result<PathBuf> {
    let work_dir = path.join(WORK_DIR_NAME);

    if work_dir.exists() {
        return Err(Error::AlreadyInitialized(work_dir.display().to_string()));
    }

    fs::create_dir_all(&work_dir)?;

    let mut config = Config::default();
    if let Some(store) = store {
        config.store.path = store.to_string();
    }
    config.save(&work_dir)?;

    Ok(work_dir)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
