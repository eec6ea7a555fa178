// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::http::Method;
use crate::registration::{ListenerOutcome, FETCH_EVENT};
use crate::store::MemoryStore;
use crate::sync::{InsertOptions, PreflightMode, SyncOptions};
use crate::test_helpers::{json_request, MockClock, MockFetch};
use serde_json::json;
use std::time::Duration;

fn manager(network: &Arc<MockFetch>) -> PersistenceManager {
    PersistenceManager::builder(Arc::new(MemoryStore::new()))
        .network(network.clone())
        .data_mapper(DataMapper::simple_json("items", "id"))
        .clock(LogClock::with_clock(MockClock::new(1000)))
        .build()
        .unwrap()
}

fn unwrap_created(registered: Registered) -> Arc<Registration> {
    match registered {
        Registered::Created(registration) => registration,
        Registered::Existing(_) => unreachable!("expected a new registration"),
    }
}

#[tokio::test]
async fn fetch_requires_init() {
    let network = MockFetch::new();
    let pm = manager(&network);

    assert!(!pm.is_initialized());
    assert!(matches!(
        pm.fetch(Request::get("https://h/x").unwrap()).await,
        Err(Error::NotInitialized)
    ));
    assert!(pm.fetcher().is_err());
}

#[tokio::test]
async fn init_is_idempotent() {
    let network = MockFetch::new();
    let pm = manager(&network);

    pm.init();
    let first = pm.fetcher().unwrap();
    pm.init();
    let second = pm.fetcher().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    pm.fetch(Request::get("https://h/x").unwrap()).await.unwrap();
    assert_eq!(network.calls().len(), 1);
}

#[test]
fn register_creates_or_lists() {
    let network = MockFetch::new();
    let pm = manager(&network);

    let first = unwrap_created(pm.register(Some(RegisterOptions::new("/x"))));
    let second = unwrap_created(pm.register(Some(RegisterOptions::new("/x"))));
    assert_ne!(first.id(), second.id());

    match pm.register(None) {
        Registered::Existing(all) => assert_eq!(all.len(), 2),
        Registered::Created(_) => unreachable!("no options must not create"),
    }

    assert_eq!(pm.get_registration("https://h/x/y").unwrap().id(), first.id());
    assert!(pm.get_registration("https://h/other").is_none());

    let mut snapshot = pm.get_registrations();
    snapshot.clear();
    assert_eq!(pm.get_registrations().len(), 2);

    assert!(pm.unregister(first.id()));
    assert_eq!(pm.get_registration("https://h/x/y").unwrap().id(), second.id());
}

#[test]
fn online_state_combines_environment_and_override() {
    let network = MockFetch::new();
    let pm = manager(&network);
    assert!(pm.is_online());

    pm.force_offline(true);
    assert!(!pm.is_online());

    pm.force_offline(false);
    pm.set_offline(true);
    assert!(!pm.is_online());

    pm.set_offline(false);
    assert!(pm.is_online());
}

#[tokio::test]
async fn watch_connectivity_follows_environment() {
    let network = MockFetch::new();
    let pm = manager(&network);
    let (tx, rx) = watch::channel(true);

    let handle = pm.watch_connectivity(rx);
    tx.send(false).unwrap();
    for _ in 0..100 {
        if !pm.is_online() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    assert!(!pm.is_online());

    tx.send(true).unwrap();
    drop(tx);
    handle.await.unwrap();
    assert!(pm.is_online());
}

#[tokio::test]
async fn browser_fetch_bypasses_registrations() {
    let network = MockFetch::new();
    let pm = manager(&network);
    pm.init();
    let registration = unwrap_created(pm.register(Some(RegisterOptions::new("/x"))));
    registration.add_event_listener(FETCH_EVENT, |_| async {
        Ok(ListenerOutcome::Respond(Response::new(299, "local")))
    });

    let intercepted = pm.fetch(Request::get("https://h/x").unwrap()).await.unwrap();
    let direct = pm.browser_fetch(Request::get("https://h/x").unwrap()).await.unwrap();

    assert_eq!(intercepted.status(), 299);
    assert_eq!(direct.status(), 200);
    assert_eq!(network.calls().len(), 1);
}

#[test]
fn accessors_share_instances() {
    let network = MockFetch::new();
    let pm = manager(&network);

    assert!(Arc::ptr_eq(&pm.get_cache(), &pm.get_cache()));
    assert!(Arc::ptr_eq(&pm.get_sync_manager(), &pm.get_sync_manager()));
    assert_eq!(pm.get_cache().name(), DEFAULT_CACHE_NAME);
}

#[tokio::test]
async fn offline_edit_and_resync() {
    let network = MockFetch::new();
    let pm = manager(&network);
    pm.init();
    let registration = unwrap_created(pm.register(Some(RegisterOptions::new("/items"))));
    pm.response_proxy().attach(&registration);

    pm.force_offline(true);
    let request = json_request(Method::Put, "https://h/items/1", json!({"id": 1, "done": true}));
    let response = pm.fetch(request).await.unwrap();

    assert_eq!(response.status(), 200);
    let sync = pm.get_sync_manager();
    assert_eq!(sync.get_sync_log().unwrap().len(), 1);
    assert!(network.calls().is_empty());

    pm.force_offline(false);
    let options = SyncOptions {
        preflight: PreflightMode::Disabled,
        ..Default::default()
    };
    let report = sync.sync(options).await.unwrap();

    assert_eq!(report.replayed, 1);
    assert!(sync.get_sync_log().unwrap().is_empty());
    assert_eq!(network.count(Method::Put), 1);
    assert_eq!(network.calls().len(), 1);
}

#[tokio::test]
async fn directly_inserted_request_is_replayed_once() {
    let network = MockFetch::new();
    let pm = manager(&network);
    pm.force_offline(true);

    let sync = pm.get_sync_manager();
    sync.insert_request(
        json_request(Method::Post, "https://h/items", json!({"id": 9})),
        InsertOptions::default(),
    )
    .unwrap();
    assert_eq!(sync.get_sync_log().unwrap().len(), 1);

    pm.force_offline(false);
    sync.sync(SyncOptions::default()).await.unwrap();
    sync.sync(SyncOptions::default()).await.unwrap();

    assert!(sync.get_sync_log().unwrap().is_empty());
    assert_eq!(network.count(Method::Post), 1);
}

#[test]
fn independent_instances_do_not_share_state() {
    let network = MockFetch::new();
    let a = manager(&network);
    let b = manager(&network);

    a.force_offline(true);
    a.register(Some(RegisterOptions::new("/x")));

    assert!(b.is_online());
    assert!(b.get_registrations().is_empty());
}
