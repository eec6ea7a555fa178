// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! offsync-core: offline persistence and sync engine
//!
//! This crate lets an application keep issuing HTTP requests while offline:
//! requests are routed through URL-scoped registrations, answered from an
//! offline cache or shredded local data, and mutating requests are queued in
//! a durable sync log that is replayed in creation order once connectivity
//! returns.

pub mod cache;
pub mod clock;
pub mod db;
pub mod error;
pub mod fetch;
pub mod http;
pub mod intercept;
pub mod manager;
pub mod proxy;
pub mod registration;
pub mod shred;
pub mod store;
pub mod sync;
pub mod undo;

#[cfg(test)]
mod test_helpers;

pub use cache::{MatchOptions, OfflineCache, ShreddedScope};
pub use clock::{ClockSource, LogClock, Stamp, SystemClock};
pub use db::SqliteStore;
pub use error::{Error, Result};
pub use fetch::{Fetch, HttpFetcher};
pub use http::{Headers, Method, Request, Response};
pub use intercept::Interceptor;
pub use manager::{Connectivity, PersistenceManager, Registered, RegisterOptions};
pub use proxy::ResponseProxy;
pub use registration::{
    ListenerId, ListenerOutcome, Registration, RegistrationEvent, RegistrationId, Scope,
};
pub use shred::{DataMapper, QueryHandler, Shredder, SimpleJsonShredding, SimpleQueryHandler, Unshredder};
pub use store::{MemoryStore, Store};
pub use sync::{
    sync_listener, InsertOptions, PreflightMode, SyncAction, SyncEvent, SyncEventType,
    SyncLogEntry, SyncManager, SyncOptions, SyncReport,
};
pub use undo::{UndoRedoData, UndoRedoOperation};
