// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod cache;
pub mod config;
pub mod init;
pub mod log;
pub mod queue;
pub mod remove;
pub mod sync;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;
pub mod undo;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use offsync_core::{Fetch, HttpFetcher, OfflineCache, SqliteStore, Store, SyncManager};

use crate::config::{find_work_dir, get_db_path, Config};
use crate::error::Result;

/// Everything a command needs: configuration, the store and a transport.
pub struct Context {
    pub config: Config,
    pub work_dir: PathBuf,
    pub store: Arc<dyn Store>,
    pub network: Arc<dyn Fetch>,
}

impl Context {
    pub fn sync_manager(&self) -> Result<SyncManager> {
        Ok(SyncManager::open(
            Arc::clone(&self.store),
            Arc::clone(&self.network),
        )?)
    }

    pub fn cache(&self, name: &str) -> Result<OfflineCache> {
        Ok(OfflineCache::open(
            name,
            Arc::clone(&self.store),
            Arc::clone(&self.network),
        )?)
    }
}

/// Helper to open the store from the current context.
pub fn open_context() -> Result<Context> {
    let work_dir = find_work_dir()?;
    let config = Config::load(&work_dir)?;
    let db_path = get_db_path(&work_dir, &config);
    let store = Arc::new(SqliteStore::open(&db_path)?);
    let network = Arc::new(HttpFetcher::new(config.http.timeout())?);
    Ok(Context {
        config,
        work_dir,
        store,
        network,
    })
}

/// Runs an async operation to completion on a single-threaded runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}
