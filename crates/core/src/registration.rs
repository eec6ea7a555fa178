// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! URL scope registrations and their event listeners.
//!
//! A [`Registration`] binds a URL [`Scope`] to an ordered list of listeners.
//! The [`RegistrationTable`] is consulted by the interceptor: the first
//! registration whose scope matches a request url handles it.
//!
//! Listeners return an explicit [`ListenerOutcome`] instead of sentinel
//! values:
//! - `Continue` passes the event to the next listener
//! - `Cancel` stops dispatch (for fetch events the request falls through to
//!   the network)
//! - `Respond(response)` answers a fetch event

use futures_util::future::BoxFuture;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::error::{Error, Result};
use crate::http::{Request, Response};

/// Event type name of fetch events.
pub const FETCH_EVENT: &str = "fetch";

/// Identifies a listener so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Identifies a registration in its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationId(pub(crate) u64);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// URL pattern a registration applies to.
#[derive(Debug, Clone)]
pub enum Scope {
    /// Matches urls containing the string.
    Contains(String),
    /// Matches urls the regular expression finds a match in.
    Pattern(Regex),
}

impl Scope {
    /// Build a regex scope.
    pub fn regex(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| Error::InvalidScope {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Scope::Pattern(regex))
    }

    pub fn matches(&self, url: &str) -> bool {
        match self {
            Scope::Contains(fragment) => url.contains(fragment.as_str()),
            Scope::Pattern(regex) => regex.is_match(url),
        }
    }
}

impl From<&str> for Scope {
    fn from(fragment: &str) -> Self {
        Scope::Contains(fragment.to_string())
    }
}

impl From<String> for Scope {
    fn from(fragment: String) -> Self {
        Scope::Contains(fragment)
    }
}

impl From<Regex> for Scope {
    fn from(regex: Regex) -> Self {
        Scope::Pattern(regex)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Contains(fragment) => f.write_str(fragment),
            Scope::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

/// Event delivered to registration listeners.
#[derive(Debug, Clone)]
pub enum RegistrationEvent {
    /// A request routed through the interceptor.
    Fetch(Request),
    /// An application-defined event such as `add` or `remove`.
    Custom { event_type: String, detail: Value },
}

impl RegistrationEvent {
    pub fn event_type(&self) -> &str {
        match self {
            RegistrationEvent::Fetch(_) => FETCH_EVENT,
            RegistrationEvent::Custom { event_type, .. } => event_type,
        }
    }

    pub fn request(&self) -> Option<&Request> {
        match self {
            RegistrationEvent::Fetch(request) => Some(request),
            RegistrationEvent::Custom { .. } => None,
        }
    }
}

/// Result of one listener invocation.
#[derive(Debug, Clone)]
pub enum ListenerOutcome {
    Continue,
    Cancel,
    Respond(Response),
}

/// A registration listener.
pub type Listener =
    Arc<dyn Fn(RegistrationEvent) -> BoxFuture<'static, Result<ListenerOutcome>> + Send + Sync>;

struct ListenerEntry {
    id: ListenerId,
    event_type: String,
    listener: Listener,
}

/// A scope plus the listeners bound to it.
pub struct Registration {
    id: RegistrationId,
    scope: Scope,
    next_listener: AtomicU64,
    listeners: RwLock<Vec<ListenerEntry>>,
}

impl Registration {
    fn new(id: RegistrationId, scope: Scope) -> Self {
        Registration {
            id,
            scope,
            next_listener: AtomicU64::new(1),
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn id(&self) -> RegistrationId {
        self.id
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Add a listener for `event_type`. Listeners run in insertion order.
    pub fn add_event_listener<F, Fut>(&self, event_type: &str, listener: F) -> ListenerId
    where
        F: Fn(RegistrationEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ListenerOutcome>> + Send + 'static,
    {
        let listener: Listener = Arc::new(
            move |event: RegistrationEvent| -> BoxFuture<'static, Result<ListenerOutcome>> {
                Box::pin(listener(event))
            },
        );
        self.add_listener(event_type, listener)
    }

    /// Add an already boxed listener.
    pub fn add_listener(&self, event_type: &str, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::SeqCst));
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        listeners.push(ListenerEntry {
            id,
            event_type: event_type.to_string(),
            listener,
        });
        id
    }

    /// Remove a listener. Returns true if it was registered.
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        let before = listeners.len();
        listeners.retain(|entry| entry.id != id);
        listeners.len() != before
    }

    /// Number of listeners for `event_type`.
    pub fn listener_count(&self, event_type: &str) -> usize {
        self.listeners_for(event_type).len()
    }

    /// Snapshot of the listeners for `event_type`, so dispatch never holds the lock.
    fn listeners_for(&self, event_type: &str) -> Vec<Listener> {
        let listeners = self.listeners.read().unwrap_or_else(|e| e.into_inner());
        listeners
            .iter()
            .filter(|entry| entry.event_type == event_type)
            .map(|entry| Arc::clone(&entry.listener))
            .collect()
    }

    /// Dispatch a fetch event.
    ///
    /// Returns the first response a listener provides, or `None` if every
    /// listener continued or one cancelled.
    pub async fn dispatch_fetch(&self, request: &Request) -> Result<Option<Response>> {
        for listener in self.listeners_for(FETCH_EVENT) {
            match listener(RegistrationEvent::Fetch(request.clone())).await? {
                ListenerOutcome::Continue => continue,
                ListenerOutcome::Respond(response) => return Ok(Some(response)),
                ListenerOutcome::Cancel => {
                    debug!(registration = %self.id, url = %request.url(), "fetch event cancelled");
                    return Ok(None);
                }
            }
        }
        Ok(None)
    }

    /// Dispatch a non-fetch event.
    ///
    /// Returns false as soon as a listener cancels; later listeners are not run.
    pub async fn dispatch_event(&self, event_type: &str, detail: Value) -> Result<bool> {
        let event = RegistrationEvent::Custom {
            event_type: event_type.to_string(),
            detail,
        };
        for listener in self.listeners_for(event_type) {
            if let ListenerOutcome::Cancel = listener(event.clone()).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self
            .listeners
            .read()
            .map(|listeners| listeners.len())
            .unwrap_or(0);
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("scope", &self.scope)
            .field("listeners", &count)
            .finish()
    }
}

/// Ordered list of registrations. Earlier registrations win.
#[derive(Default)]
pub struct RegistrationTable {
    next_id: AtomicU64,
    entries: RwLock<Vec<Arc<Registration>>>,
}

impl RegistrationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and append a registration for `scope`.
    pub fn register(&self, scope: Scope) -> Arc<Registration> {
        let id = RegistrationId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let registration = Arc::new(Registration::new(id, scope));
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.push(Arc::clone(&registration));
        registration
    }

    /// The first registration whose scope matches `url`.
    pub fn find(&self, url: &str) -> Option<Arc<Registration>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .iter()
            .find(|registration| registration.scope.matches(url))
            .cloned()
    }

    /// Snapshot of all registrations in registration order.
    pub fn all(&self) -> Vec<Arc<Registration>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.clone()
    }

    /// Remove a registration. Dispatches already holding it still complete.
    pub fn unregister(&self, id: RegistrationId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|registration| registration.id != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "registration_tests.rs"]
mod tests;
