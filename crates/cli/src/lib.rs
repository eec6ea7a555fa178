// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! offsyncrs - command line front end for the offsync engine.
//!
//! The `offsync` binary keeps a durable sync log and offline cache in a
//! SQLite store located through `.offsync/config.toml`.
//!
//! # Main Components
//!
//! - [`Config`] - Project configuration (store location, sync and http settings)
//! - [`Error`] - Error types for all commands
//!
//! ```rust,ignore
//! use offsyncrs::{find_work_dir, get_db_path, Config};
//!
//! let work_dir = find_work_dir()?;
//! let config = Config::load(&work_dir)?;
//! let store = offsync_core::SqliteStore::open(&get_db_path(&work_dir, &config))?;
//! ```

mod cli;
mod commands;
mod display;

pub mod config;
pub mod error;

pub use cli::{CacheCommand, Cli, Command, ConfigCommand, OutputFormat};
pub use config::{find_work_dir, get_db_path, init_work_dir, Config};
pub use error::{Error, Result};

use commands::undo::Direction;

pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Init { store } => commands::init::run(store),
        Command::Queue {
            method,
            url,
            headers,
            data,
            output,
        } => commands::queue::run(method, url, headers, data, output),
        Command::Log { output } => commands::log::run(output),
        Command::Remove { id } => commands::remove::run(id),
        Command::Undo { id } => commands::undo::run(id, Direction::Undo),
        Command::Redo { id } => commands::undo::run(id, Direction::Redo),
        Command::Sync {
            no_preflight,
            preflight_timeout_ms,
            output,
        } => commands::sync::run(no_preflight, preflight_timeout_ms, output),
        Command::Cache(cmd) => commands::cache::run(cmd),
        Command::Config(cmd) => commands::config::run(cmd),
    }
}
