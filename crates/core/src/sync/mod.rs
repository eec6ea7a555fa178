// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync log and replay.
//!
//! Mutating requests that cannot reach the server are queued in a durable
//! log. [`SyncManager::sync`] replays them strictly in creation order:
//!
//! 1. optional `OPTIONS` preflight (a timeout or failure aborts the sync)
//! 2. `beforeSyncRequest` listeners may replace, skip, or stop
//! 3. the request is sent with the unintercepted fetcher
//! 4. `syncRequest` listeners see the response and may stop
//! 5. the entry is removed and `afterSyncRequest` listeners are notified
//!
//! A failed replay keeps its entry queued, notifies `afterSyncRequest` with
//! the error, and ends the sync with [`Error::ReplayFailed`].
//!
//! [`Error::ReplayFailed`]: crate::Error::ReplayFailed

mod events;
mod log;
mod manager;

pub use events::{sync_listener, SyncAction, SyncEvent, SyncEventType, SyncListener};
pub use log::{SyncLogEntry, SYNC_LOG_COLLECTION};
pub use manager::{
    InsertOptions, PreflightMode, SyncManager, SyncOptions, SyncReport,
    DEFAULT_PREFLIGHT_TIMEOUT_MS,
};
