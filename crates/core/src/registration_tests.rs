// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde_json::json;
use std::sync::atomic::AtomicUsize;
use std::sync::Mutex;
use yare::parameterized;

#[parameterized(
    contains_prefix = { Scope::from("/items"), "https://api.example.com/items/1", true },
    contains_miss = { Scope::from("/orders"), "https://api.example.com/items/1", false },
    regex_hit = { Scope::regex(r"/items/\d+$").unwrap(), "https://api.example.com/items/42", true },
    regex_miss = { Scope::regex(r"/items/\d+$").unwrap(), "https://api.example.com/items/new", false },
)]
fn scope_matching(scope: Scope, url: &str, expected: bool) {
    assert_eq!(scope.matches(url), expected);
}

#[test]
fn scope_rejects_bad_regex() {
    assert!(matches!(
        Scope::regex("(unclosed"),
        Err(Error::InvalidScope { .. })
    ));
}

#[test]
fn register_twice_creates_independent_registrations() {
    let table = RegistrationTable::new();
    let first = table.register(Scope::from("/x"));
    let second = table.register(Scope::from("/x"));

    assert_ne!(first.id(), second.id());
    assert_eq!(table.len(), 2);

    let found = table.find("https://host/x/y").unwrap();
    assert_eq!(found.id(), first.id());
}

#[test]
fn find_returns_none_when_nothing_matches() {
    let table = RegistrationTable::new();
    table.register(Scope::from("/x"));
    assert!(table.find("https://host/other").is_none());
}

#[test]
fn all_returns_snapshot() {
    let table = RegistrationTable::new();
    table.register(Scope::from("/a"));

    let mut snapshot = table.all();
    snapshot.clear();

    assert_eq!(table.all().len(), 1);
}

#[test]
fn unregister_removes_but_held_handles_survive() {
    let table = RegistrationTable::new();
    let registration = table.register(Scope::from("/a"));

    assert!(table.unregister(registration.id()));
    assert!(!table.unregister(registration.id()));
    assert!(table.find("https://host/a").is_none());
    assert_eq!(registration.scope().to_string(), "/a");
}

#[tokio::test]
async fn dispatch_fetch_runs_listeners_in_order_until_response() {
    let table = RegistrationTable::new();
    let registration = table.register(Scope::from("/items"));
    let calls = Arc::new(Mutex::new(Vec::new()));

    let log = Arc::clone(&calls);
    registration.add_event_listener(FETCH_EVENT, move |_| {
        let log = Arc::clone(&log);
        async move {
            log.lock().unwrap().push("first");
            Ok(ListenerOutcome::Continue)
        }
    });
    let log = Arc::clone(&calls);
    registration.add_event_listener(FETCH_EVENT, move |event| {
        let log = Arc::clone(&log);
        async move {
            log.lock().unwrap().push("second");
            let url = event.request().unwrap().url().to_string();
            Ok(ListenerOutcome::Respond(Response::new(200, url)))
        }
    });
    let log = Arc::clone(&calls);
    registration.add_event_listener(FETCH_EVENT, move |_| {
        let log = Arc::clone(&log);
        async move {
            log.lock().unwrap().push("third");
            Ok(ListenerOutcome::Continue)
        }
    });

    let request = Request::get("https://api.example.com/items").unwrap();
    let response = registration.dispatch_fetch(&request).await.unwrap().unwrap();

    assert_eq!(response.text().unwrap(), "https://api.example.com/items");
    assert_eq!(*calls.lock().unwrap(), vec!["first", "second"]);
}

#[tokio::test]
async fn dispatch_fetch_without_response_is_none() {
    let table = RegistrationTable::new();
    let registration = table.register(Scope::from("/items"));
    registration.add_event_listener(FETCH_EVENT, |_| async { Ok(ListenerOutcome::Continue) });

    let request = Request::get("https://api.example.com/items").unwrap();
    assert!(registration.dispatch_fetch(&request).await.unwrap().is_none());
}

#[tokio::test]
async fn dispatch_fetch_propagates_listener_errors() {
    let table = RegistrationTable::new();
    let registration = table.register(Scope::from("/items"));
    registration.add_event_listener(FETCH_EVENT, |_| async {
        Err(Error::Listener("boom".into()))
    });

    let request = Request::get("https://api.example.com/items").unwrap();
    assert!(matches!(
        registration.dispatch_fetch(&request).await,
        Err(Error::Listener(_))
    ));
}

#[tokio::test]
async fn dispatch_event_short_circuits_on_cancel() {
    let table = RegistrationTable::new();
    let registration = table.register(Scope::from("/items"));
    let count = Arc::new(AtomicUsize::new(0));

    for outcome in [ListenerOutcome::Continue, ListenerOutcome::Cancel, ListenerOutcome::Continue] {
        let count = Arc::clone(&count);
        registration.add_event_listener("remove", move |_| {
            let count = Arc::clone(&count);
            let outcome = outcome.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Ok(outcome)
            }
        });
    }

    let allowed = registration
        .dispatch_event("remove", json!({"key": "1"}))
        .await
        .unwrap();

    assert!(!allowed);
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn dispatch_event_ignores_other_event_types() {
    let table = RegistrationTable::new();
    let registration = table.register(Scope::from("/items"));
    registration.add_event_listener("add", |_| async { Ok(ListenerOutcome::Cancel) });

    assert!(registration.dispatch_event("remove", json!(null)).await.unwrap());
    assert!(!registration.dispatch_event("add", json!(null)).await.unwrap());
}

#[test]
fn remove_event_listener() {
    let table = RegistrationTable::new();
    let registration = table.register(Scope::from("/items"));
    let id = registration.add_event_listener(FETCH_EVENT, |_| async { Ok(ListenerOutcome::Continue) });

    assert_eq!(registration.listener_count(FETCH_EVENT), 1);
    assert!(registration.remove_event_listener(id));
    assert!(!registration.remove_event_listener(id));
    assert_eq!(registration.listener_count(FETCH_EVENT), 0);
}
