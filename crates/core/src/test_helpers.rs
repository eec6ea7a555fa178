// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for offsync-core tests.

#![allow(clippy::unwrap_used)]

use futures_util::future::BoxFuture;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::clock::ClockSource;
use crate::error::{Error, Result};
use crate::fetch::Fetch;
use crate::http::{Method, Request, Response};
use crate::store::Store;

/// Mock clock with controllable time. Clones share the same time.
#[derive(Clone)]
pub struct MockClock {
    time_ms: Arc<AtomicU64>,
}

impl MockClock {
    pub fn new(initial_ms: u64) -> Self {
        MockClock {
            time_ms: Arc::new(AtomicU64::new(initial_ms)),
        }
    }

    pub fn set(&self, ms: u64) {
        self.time_ms.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.time_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl ClockSource for MockClock {
    fn now_ms(&self) -> u64 {
        self.time_ms.load(Ordering::SeqCst)
    }
}

/// How the mock fetcher answers a matching request.
#[derive(Clone)]
pub enum Route {
    Respond(Response),
    Fail(String),
    Hang,
}

struct RouteEntry {
    method: Option<Method>,
    url_fragment: String,
    route: Route,
}

/// Mock fetcher recording every request it receives.
///
/// Requests matching no route get an empty `200`.
#[derive(Default)]
pub struct MockFetch {
    calls: Mutex<Vec<Request>>,
    routes: Mutex<Vec<RouteEntry>>,
}

impl MockFetch {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer requests whose url contains `url_fragment` (and method, if given).
    /// Routes added later take precedence.
    pub fn on(&self, method: Option<Method>, url_fragment: &str, route: Route) {
        self.routes.lock().unwrap().push(RouteEntry {
            method,
            url_fragment: url_fragment.to_string(),
            route,
        });
    }

    pub fn calls(&self) -> Vec<Request> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of requests received with `method`.
    pub fn count(&self, method: Method) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method() == method)
            .count()
    }

    /// Requests received other than preflight probes.
    pub fn replays(&self) -> Vec<Request> {
        self.calls()
            .into_iter()
            .filter(|r| r.method() != Method::Options)
            .collect()
    }

    fn route_for(&self, request: &Request) -> Option<Route> {
        let routes = self.routes.lock().unwrap();
        routes
            .iter()
            .rev()
            .find(|entry| {
                entry.method.map_or(true, |m| m == request.method())
                    && request.url().contains(&entry.url_fragment)
            })
            .map(|entry| entry.route.clone())
    }
}

impl Fetch for MockFetch {
    fn fetch(&self, request: Request) -> BoxFuture<'_, Result<Response>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(request.clone());
            match self.route_for(&request) {
                Some(Route::Respond(response)) => Ok(response.with_url(request.url())),
                Some(Route::Fail(reason)) => Err(Error::Network(reason)),
                Some(Route::Hang) => std::future::pending::<Result<Response>>().await,
                None => Ok(Response::new(200, Vec::new()).with_url(request.url())),
            }
        })
    }
}

/// A JSON request.
pub fn json_request(method: Method, url: &str, body: serde_json::Value) -> Request {
    Request::new(method, url).unwrap().with_json(&body).unwrap()
}

/// Exercise the [`Store`] contract against an implementation.
pub fn exercise_store(store: &dyn Store) {
    assert_eq!(store.get("items", "a").unwrap(), None);
    assert!(store.keys("items").unwrap().is_empty());

    store.upsert("items", "b", &json!({"n": 2})).unwrap();
    store.upsert("items", "a", &json!({"n": 1})).unwrap();
    store.upsert("other", "a", &json!("x")).unwrap();

    assert_eq!(store.get("items", "a").unwrap(), Some(json!({"n": 1})));
    assert_eq!(store.keys("items").unwrap(), vec!["a", "b"]);

    let entries = store.entries("items").unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].0, "a");
    assert_eq!(entries[1].1, json!({"n": 2}));

    store.upsert("items", "a", &json!({"n": 10})).unwrap();
    assert_eq!(store.get("items", "a").unwrap(), Some(json!({"n": 10})));

    assert!(store.remove("items", "a").unwrap());
    assert!(!store.remove("items", "a").unwrap());
    assert!(!store.remove("missing", "a").unwrap());

    assert_eq!(store.clear("items").unwrap(), 1);
    assert!(store.entries("items").unwrap().is_empty());
    assert_eq!(store.get("other", "a").unwrap(), Some(json!("x")));
}
