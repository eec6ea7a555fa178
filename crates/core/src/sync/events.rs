// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Replay lifecycle events and their listeners.

use futures_util::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::warn;

use crate::error::{Error, Result};
use crate::http::{Request, Response};
use crate::registration::{ListenerId, Scope};

/// Points in the replay of one log entry where listeners run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncEventType {
    /// Before the request is sent; may replace, skip or stop.
    BeforeSyncRequest,
    /// After a response arrives; may stop.
    SyncRequest,
    /// After the entry is handled or failed; informational.
    AfterSyncRequest,
}

impl SyncEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncEventType::BeforeSyncRequest => "beforeSyncRequest",
            SyncEventType::SyncRequest => "syncRequest",
            SyncEventType::AfterSyncRequest => "afterSyncRequest",
        }
    }
}

impl fmt::Display for SyncEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncEventType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "beforeSyncRequest" => Ok(SyncEventType::BeforeSyncRequest),
            "syncRequest" => Ok(SyncEventType::SyncRequest),
            "afterSyncRequest" => Ok(SyncEventType::AfterSyncRequest),
            _ => Err(Error::InvalidEventType(s.to_string())),
        }
    }
}

/// Payload delivered to sync listeners.
#[derive(Debug, Clone)]
pub struct SyncEvent {
    pub event_type: SyncEventType,
    pub request_id: String,
    /// The request being replayed (after any `Replay` substitution).
    pub request: Request,
    /// The server response, once there is one.
    pub response: Option<Response>,
    /// Why the replay failed, for failed `afterSyncRequest` events.
    pub error: Option<String>,
}

impl SyncEvent {
    pub(crate) fn new(event_type: SyncEventType, request_id: &str, request: &Request) -> Self {
        SyncEvent {
            event_type,
            request_id: request_id.to_string(),
            request: request.clone(),
            response: None,
            error: None,
        }
    }

    pub(crate) fn with_response(mut self, response: &Response) -> Self {
        self.response = Some(response.clone());
        self
    }

    pub(crate) fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// What a listener wants done with the current entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Proceed unchanged.
    Continue,
    /// Send this request instead of the logged one.
    Replay(Request),
    /// Drop the entry without sending it.
    Skip,
    /// End the sync.
    Stop,
}

/// A sync listener.
pub type SyncListener =
    Arc<dyn Fn(SyncEvent) -> BoxFuture<'static, Result<SyncAction>> + Send + Sync>;

/// Wraps an async closure as a [`SyncListener`].
pub fn sync_listener<F, Fut>(listener: F) -> SyncListener
where
    F: Fn(SyncEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<SyncAction>> + Send + 'static,
{
    Arc::new(
        move |event: SyncEvent| -> BoxFuture<'static, Result<SyncAction>> {
            Box::pin(listener(event))
        },
    )
}

struct Entry {
    id: ListenerId,
    event_type: SyncEventType,
    scope: Option<Scope>,
    listener: SyncListener,
}

/// Listeners per event type, in registration order.
#[derive(Default)]
pub(crate) struct SyncListeners {
    next_id: AtomicU64,
    entries: RwLock<Vec<Entry>>,
}

impl SyncListeners {
    pub(crate) fn add(
        &self,
        event_type: SyncEventType,
        scope: Option<Scope>,
        listener: SyncListener,
    ) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.push(Entry {
            id,
            event_type,
            scope,
            listener,
        });
        id
    }

    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        entries.len() != before
    }

    fn matching(&self, event_type: SyncEventType, url: &str) -> Vec<SyncListener> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .iter()
            .filter(|entry| entry.event_type == event_type)
            .filter(|entry| entry.scope.as_ref().map_or(true, |scope| scope.matches(url)))
            .map(|entry| Arc::clone(&entry.listener))
            .collect()
    }

    /// Runs listeners in order until one answers something other than `Continue`.
    pub(crate) async fn dispatch(&self, event: SyncEvent) -> Result<SyncAction> {
        for listener in self.matching(event.event_type, event.request.url()) {
            match listener(event.clone()).await? {
                SyncAction::Continue => continue,
                action => return Ok(action),
            }
        }
        Ok(SyncAction::Continue)
    }

    /// Runs every listener. Answers are ignored and errors are only logged.
    pub(crate) async fn notify(&self, event: SyncEvent) {
        for listener in self.matching(event.event_type, event.request.url()) {
            if let Err(e) = listener(event.clone()).await {
                warn!(
                    event = %event.event_type,
                    request_id = %event.request_id,
                    error = %e,
                    "sync listener failed"
                );
            }
        }
    }
}
