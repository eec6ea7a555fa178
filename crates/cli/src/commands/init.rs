// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::{Path, PathBuf};

use offsync_core::SqliteStore;

use crate::config::{get_db_path, init_work_dir, Config};
use crate::error::Result;

pub fn run(store: Option<String>) -> Result<()> {
    let target_path = std::env::current_dir()?;
    let (work_dir, db_path) = run_impl(&target_path, store.as_deref())?;

    println!("Initialized offsync at {}", work_dir.display());
    println!("Store: {}", db_path.display());
    Ok(())
}

/// Creates `.offsync/` under `path` and the store it points at.
pub(crate) fn run_impl(path: &Path, store: Option<&str>) -> Result<(PathBuf, PathBuf)> {
    let work_dir = init_work_dir(path, store)?;
    let config = Config::load(&work_dir)?;
    let db_path = get_db_path(&work_dir, &config);
    SqliteStore::open(&db_path)?;
    Ok((work_dir, db_path))
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
