// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable sync log.
//!
//! Each queued request is one record of the `sync_log` collection, keyed by
//! its request id (a [`Stamp`]). Store keys sort as text, so the log is
//! always re-sorted by creation time on read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::clock::{LogClock, Stamp};
use crate::error::Result;
use crate::http::Request;
use crate::store::{load, load_all, save, Store};
use crate::undo::{apply_redo, apply_undo, UndoRedoData};

/// Collection holding the sync log.
pub const SYNC_LOG_COLLECTION: &str = "sync_log";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LogRecord {
    request: Request,
    created_at: DateTime<Utc>,
    #[serde(default)]
    attempts: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    undo_redo: Vec<UndoRedoData>,
}

/// A request waiting to be replayed.
#[derive(Clone)]
pub struct SyncLogEntry {
    request_id: String,
    stamp: Stamp,
    request: Request,
    created_at: DateTime<Utc>,
    attempts: u32,
    undo_redo: Vec<UndoRedoData>,
    store: Arc<dyn Store>,
}

impl SyncLogEntry {
    fn from_record(request_id: String, stamp: Stamp, record: LogRecord, store: Arc<dyn Store>) -> Self {
        SyncLogEntry {
            request_id,
            stamp,
            request: record.request,
            created_at: record.created_at,
            attempts: record.attempts,
            undo_redo: record.undo_redo,
            store,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Failed replay attempts so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn undo_redo_data(&self) -> &[UndoRedoData] {
        &self.undo_redo
    }

    /// Reverts the local store changes recorded for this request.
    ///
    /// Returns true if there was data to act on.
    pub fn undo(&self) -> Result<bool> {
        apply_undo(self.store.as_ref(), &self.undo_redo)
    }

    /// Reapplies the local store changes recorded for this request.
    pub fn redo(&self) -> Result<bool> {
        apply_redo(self.store.as_ref(), &self.undo_redo)
    }
}

impl fmt::Debug for SyncLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncLogEntry")
            .field("request_id", &self.request_id)
            .field("method", &self.request.method())
            .field("url", &self.request.url())
            .field("created_at", &self.created_at)
            .field("attempts", &self.attempts)
            .field("undo_redo", &self.undo_redo.len())
            .finish()
    }
}

/// Typed access to the log collection.
pub(crate) struct SyncLog {
    store: Arc<dyn Store>,
    clock: LogClock,
}

impl SyncLog {
    /// Opens the log, making new ids sort after every persisted one.
    pub(crate) fn open(store: Arc<dyn Store>, clock: LogClock) -> Result<Self> {
        let log = SyncLog { store, clock };
        for entry in log.entries()? {
            log.clock.observe(entry.stamp);
        }
        Ok(log)
    }

    /// Every entry, ascending by creation time.
    pub(crate) fn entries(&self) -> Result<Vec<SyncLogEntry>> {
        let mut entries = Vec::new();
        for (key, record) in load_all::<LogRecord>(self.store.as_ref(), SYNC_LOG_COLLECTION)? {
            let stamp = key.parse::<Stamp>()?;
            entries.push(SyncLogEntry::from_record(key, stamp, record, Arc::clone(&self.store)));
        }
        entries.sort_by_key(|entry| (entry.created_at, entry.stamp));
        Ok(entries)
    }

    pub(crate) fn get(&self, request_id: &str) -> Result<Option<SyncLogEntry>> {
        let Ok(stamp) = request_id.parse::<Stamp>() else {
            return Ok(None);
        };
        let record = load::<LogRecord>(self.store.as_ref(), SYNC_LOG_COLLECTION, request_id)?;
        Ok(record.map(|record| {
            SyncLogEntry::from_record(request_id.to_string(), stamp, record, Arc::clone(&self.store))
        }))
    }

    pub(crate) fn insert(&self, request: Request, undo_redo: Vec<UndoRedoData>) -> Result<String> {
        let stamp = self.clock.now();
        let request_id = stamp.to_string();
        let record = LogRecord {
            request,
            created_at: stamp.created_at(),
            attempts: 0,
            undo_redo,
        };
        save(self.store.as_ref(), SYNC_LOG_COLLECTION, &request_id, &record)?;
        Ok(request_id)
    }

    pub(crate) fn remove(&self, request_id: &str) -> Result<Option<SyncLogEntry>> {
        let Some(entry) = self.get(request_id)? else {
            return Ok(None);
        };
        if !self.store.remove(SYNC_LOG_COLLECTION, request_id)? {
            return Ok(None);
        }
        Ok(Some(entry))
    }

    /// Replaces the request of an entry, returning the previous one.
    pub(crate) fn update(&self, request_id: &str, request: Request) -> Result<Option<Request>> {
        let Some(mut record) = load::<LogRecord>(self.store.as_ref(), SYNC_LOG_COLLECTION, request_id)? else {
            return Ok(None);
        };
        let previous = std::mem::replace(&mut record.request, request);
        save(self.store.as_ref(), SYNC_LOG_COLLECTION, request_id, &record)?;
        Ok(Some(previous))
    }

    /// Counts a failed replay. Returns the new attempt count.
    pub(crate) fn record_failure(&self, request_id: &str) -> Result<u32> {
        let Some(mut record) = load::<LogRecord>(self.store.as_ref(), SYNC_LOG_COLLECTION, request_id)? else {
            return Ok(0);
        };
        record.attempts = record.attempts.saturating_add(1);
        save(self.store.as_ref(), SYNC_LOG_COLLECTION, request_id, &record)?;
        Ok(record.attempts)
    }
}
