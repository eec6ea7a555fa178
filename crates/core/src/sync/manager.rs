// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync manager: the sync log API and the replay protocol.

use regex::Regex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::events::{SyncAction, SyncEvent, SyncEventType, SyncListener, SyncListeners};
use super::log::{SyncLog, SyncLogEntry};
use crate::clock::LogClock;
use crate::error::{Error, Result};
use crate::fetch::Fetch;
use crate::http::{Method, Request, Response};
use crate::registration::{ListenerId, Scope};
use crate::store::Store;
use crate::undo::UndoRedoData;

/// Default preflight timeout in milliseconds.
pub const DEFAULT_PREFLIGHT_TIMEOUT_MS: u64 = 60_000;

/// Which entries get an `OPTIONS` connectivity probe before replay.
#[derive(Debug, Clone, Default)]
pub enum PreflightMode {
    /// Every entry.
    #[default]
    Enabled,
    /// No entry.
    Disabled,
    /// Entries whose url matches the pattern.
    Matching(Regex),
}

impl PreflightMode {
    /// Parses `enabled`, `disabled`, or a regular expression.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "enabled" => Ok(PreflightMode::Enabled),
            "disabled" => Ok(PreflightMode::Disabled),
            pattern => Regex::new(pattern)
                .map(PreflightMode::Matching)
                .map_err(|e| Error::InvalidScope {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                }),
        }
    }

    pub fn applies_to(&self, url: &str) -> bool {
        match self {
            PreflightMode::Enabled => true,
            PreflightMode::Disabled => false,
            PreflightMode::Matching(regex) => regex.is_match(url),
        }
    }
}

/// Options for one [`SyncManager::sync`] call.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub preflight: PreflightMode,
    pub preflight_timeout_ms: u64,
    /// Failed attempts after which an entry is dropped. `None` keeps it forever.
    pub max_attempts: Option<u32>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions {
            preflight: PreflightMode::Enabled,
            preflight_timeout_ms: DEFAULT_PREFLIGHT_TIMEOUT_MS,
            max_attempts: None,
        }
    }
}

/// Options for [`SyncManager::insert_request`].
#[derive(Debug, Clone, Default)]
pub struct InsertOptions {
    /// Local store mutations tied to the request.
    pub undo_redo: Vec<UndoRedoData>,
}

/// What a sync call did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Entries sent and removed.
    pub replayed: usize,
    /// Entries removed without sending.
    pub skipped: usize,
    /// Entries removed after exhausting their attempts.
    pub dropped: usize,
    /// True if a listener ended the sync early.
    pub stopped: bool,
}

/// Clears the syncing flag when a sync ends, however it ends.
struct SyncGuard<'a>(&'a AtomicBool);

impl<'a> SyncGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| Error::SyncInProgress)?;
        Ok(SyncGuard(flag))
    }
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// How the replay of one entry ended.
enum Outcome {
    Replayed,
    Skipped,
    Dropped,
    Stop { handled: bool },
}

/// Owns the sync log and replays it.
///
/// A second `sync` while one is running fails with [`Error::SyncInProgress`].
pub struct SyncManager {
    log: SyncLog,
    listeners: SyncListeners,
    network: Arc<dyn Fetch>,
    syncing: AtomicBool,
}

impl SyncManager {
    /// Opens the log in `store`. Replays go straight to `network`.
    pub fn open(store: Arc<dyn Store>, network: Arc<dyn Fetch>) -> Result<Self> {
        Self::with_clock(store, network, LogClock::system())
    }

    /// Opens the log with a custom id clock.
    pub fn with_clock(store: Arc<dyn Store>, network: Arc<dyn Fetch>, clock: LogClock) -> Result<Self> {
        Ok(SyncManager {
            log: SyncLog::open(store, clock)?,
            listeners: SyncListeners::default(),
            network,
            syncing: AtomicBool::new(false),
        })
    }

    /// Every queued entry, ascending by creation time.
    pub fn get_sync_log(&self) -> Result<Vec<SyncLogEntry>> {
        self.log.entries()
    }

    /// A queued entry by id.
    pub fn get_request(&self, request_id: &str) -> Result<Option<SyncLogEntry>> {
        self.log.get(request_id)
    }

    /// Queues a request. Returns its id.
    pub fn insert_request(&self, request: Request, options: InsertOptions) -> Result<String> {
        let request_id = self.log.insert(request, options.undo_redo)?;
        debug!(request_id = %request_id, "queued request");
        Ok(request_id)
    }

    /// Removes an entry. Returns it, or `None` if there was no such entry.
    pub fn remove_request(&self, request_id: &str) -> Result<Option<SyncLogEntry>> {
        self.log.remove(request_id)
    }

    /// Replaces the request of an entry in place. Returns the previous request.
    pub fn update_request(&self, request_id: &str, request: Request) -> Result<Option<Request>> {
        self.log.update(request_id, request)
    }

    /// Adds a listener, optionally limited to entries whose url matches `scope`.
    pub fn add_event_listener(
        &self,
        event_type: SyncEventType,
        scope: Option<Scope>,
        listener: SyncListener,
    ) -> ListenerId {
        self.listeners.add(event_type, scope, listener)
    }

    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::SeqCst)
    }

    /// Replays the log in creation order.
    ///
    /// Stops at the first entry whose replay fails, leaving it and every
    /// later entry queued. A preflight failure aborts before anything from
    /// that entry on is touched.
    pub async fn sync(&self, options: SyncOptions) -> Result<SyncReport> {
        let _guard = SyncGuard::acquire(&self.syncing)?;
        let mut report = SyncReport::default();

        let ids: Vec<String> = self
            .log
            .entries()?
            .into_iter()
            .map(|entry| entry.request_id().to_string())
            .collect();
        info!(entries = ids.len(), "sync started");

        for request_id in ids {
            // Listeners may have removed or edited entries since the snapshot
            let Some(entry) = self.log.get(&request_id)? else {
                continue;
            };

            match self.replay(&entry, &options).await? {
                Outcome::Replayed => report.replayed += 1,
                Outcome::Skipped => report.skipped += 1,
                Outcome::Dropped => report.dropped += 1,
                Outcome::Stop { handled } => {
                    if handled {
                        report.replayed += 1;
                    }
                    report.stopped = true;
                    break;
                }
            }
        }

        info!(
            replayed = report.replayed,
            skipped = report.skipped,
            dropped = report.dropped,
            stopped = report.stopped,
            "sync finished"
        );
        Ok(report)
    }

    async fn replay(&self, entry: &SyncLogEntry, options: &SyncOptions) -> Result<Outcome> {
        let request_id = entry.request_id();

        if options.preflight.applies_to(entry.request().url()) {
            self.preflight(entry.request().url(), options.preflight_timeout_ms)
                .await?;
        }

        let before = SyncEvent::new(SyncEventType::BeforeSyncRequest, request_id, entry.request());
        let request = match self.listeners.dispatch(before).await? {
            SyncAction::Continue => entry.request().clone(),
            SyncAction::Replay(request) => request,
            SyncAction::Skip => {
                self.log.remove(request_id)?;
                debug!(request_id = %request_id, "skipped by listener");
                return Ok(Outcome::Skipped);
            }
            SyncAction::Stop => {
                debug!(request_id = %request_id, "stopped by listener before replay");
                return Ok(Outcome::Stop { handled: false });
            }
        };

        debug!(request_id = %request_id, method = %request.method(), url = %request.url(), "replaying");
        let response = match self.network.fetch(request.clone()).await {
            Ok(response) => response,
            Err(e) => {
                return self
                    .fail(request_id, &request, None, e.to_string(), options)
                    .await;
            }
        };

        let event = SyncEvent::new(SyncEventType::SyncRequest, request_id, &request)
            .with_response(&response);
        let stop = self.listeners.dispatch(event).await? == SyncAction::Stop;

        if !response.ok() && !stop {
            let reason = format!("server responded with status {}", response.status());
            return self
                .fail(request_id, &request, Some(&response), reason, options)
                .await;
        }

        self.log.remove(request_id)?;
        info!(request_id = %request_id, status = response.status(), "replayed");
        let after = SyncEvent::new(SyncEventType::AfterSyncRequest, request_id, &request)
            .with_response(&response);
        self.listeners.notify(after).await;

        if stop {
            Ok(Outcome::Stop { handled: true })
        } else {
            Ok(Outcome::Replayed)
        }
    }

    /// Records a failed replay. Drops the entry once it is out of attempts,
    /// otherwise ends the sync with [`Error::ReplayFailed`].
    async fn fail(
        &self,
        request_id: &str,
        request: &Request,
        response: Option<&Response>,
        reason: String,
        options: &SyncOptions,
    ) -> Result<Outcome> {
        let attempts = self.log.record_failure(request_id)?;
        warn!(request_id = %request_id, attempts, reason = %reason, "replay failed");

        let mut after = SyncEvent::new(SyncEventType::AfterSyncRequest, request_id, request)
            .with_error(reason.clone());
        if let Some(response) = response {
            after = after.with_response(response);
        }
        self.listeners.notify(after).await;

        if options.max_attempts.is_some_and(|max| attempts >= max) {
            self.log.remove(request_id)?;
            warn!(request_id = %request_id, attempts, "dropped after too many attempts");
            return Ok(Outcome::Dropped);
        }

        Err(Error::ReplayFailed {
            request_id: request_id.to_string(),
            reason,
            status: response.map(Response::status),
        })
    }

    async fn preflight(&self, url: &str, timeout_ms: u64) -> Result<()> {
        let probe = Request::new(Method::Options, url)?;
        let timeout = Duration::from_millis(timeout_ms);

        match tokio::time::timeout(timeout, self.network.fetch(probe)).await {
            Err(_) => {
                warn!(url = %url, timeout_ms, "preflight timed out");
                Err(Error::PreflightTimeout {
                    url: url.to_string(),
                    timeout_ms,
                })
            }
            Ok(Err(e)) => {
                warn!(url = %url, error = %e, "preflight failed");
                Err(Error::PreflightFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
            Ok(Ok(response)) => {
                debug!(url = %url, status = response.status(), "preflight ok");
                Ok(())
            }
        }
    }
}
