// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline cache of request/response pairs.
//!
//! Entries live in one collection of the [`Store`] and are keyed by a
//! SHA-256 digest of the exact (method, url, vary header values) tuple, so
//! `put` overwrites an entry with the same tuple. Matching follows the
//! Cache API rules, broadened by [`MatchOptions`].
//!
//! When a [`DataMapper`] is configured, JSON responses are shredded on
//! `put`: the rows go to the mapper's collection and the cache entry keeps a
//! reference to their keys instead of the body. `match_request` rebuilds the
//! body from the current rows, so local edits to shredded data show up in
//! cached responses. Rows are owned by the entries that reference them and
//! are removed with the last such entry.

use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::clock::{LogClock, Stamp};
use crate::error::{Error, Result};
use crate::fetch::Fetch;
use crate::http::{Request, Response};
use crate::shred::{DataMapper, ResourceType, ShreddedData, ShreddedRow};
use crate::store::{load_all, save, Store};

/// Collection prefix for cache entries.
const CACHE_COLLECTION_PREFIX: &str = "cache:";

/// Default cache name.
pub const DEFAULT_CACHE_NAME: &str = "default";

/// Options broadening how stored requests match a query request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Ignore the query string when comparing urls.
    pub ignore_search: bool,
    /// Ignore the request method.
    pub ignore_method: bool,
    /// Ignore the headers named by the stored response's `Vary` header.
    pub ignore_vary: bool,
}

/// Where the rows of a shredded entry live.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ShreddedRef {
    store_name: String,
    resource_type: ResourceType,
    keys: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheRecord {
    request: Request,
    response: Response,
    stamp: Stamp,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shredded: Option<ShreddedRef>,
}

/// How a request relates to the shredded entries of a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShreddedScope {
    /// The request names the url a shredded entry was stored for.
    Resource,
    /// The request names an item directly below such a url.
    Item,
}

/// The url without query or trailing slash.
fn resource_url(request: &Request) -> String {
    request.normalized_url(true).trim_end_matches('/').to_string()
}

/// Computes the entry key of an exact (method, url, vary values) tuple.
fn cache_key(request: &Request, response: &Response) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request.method().as_str().as_bytes());
    hasher.update(b" ");
    hasher.update(request.normalized_url(false).as_bytes());
    for name in response.vary() {
        hasher.update(b"\n");
        hasher.update(name.as_bytes());
        hasher.update(b": ");
        hasher.update(request.headers().get(&name).unwrap_or_default().as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Returns true if the stored pair answers `query` under `options`.
fn matches(record: &CacheRecord, query: &Request, options: MatchOptions) -> bool {
    if !options.ignore_method && record.request.method() != query.method() {
        return false;
    }
    if record.request.normalized_url(options.ignore_search)
        != query.normalized_url(options.ignore_search)
    {
        return false;
    }
    if options.ignore_vary {
        return true;
    }
    record.response.vary().iter().all(|name| {
        name != "*" && record.request.headers().get(name) == query.headers().get(name)
    })
}

/// A named offline cache.
pub struct OfflineCache {
    name: String,
    collection: String,
    store: Arc<dyn Store>,
    network: Arc<dyn Fetch>,
    data_mapper: Option<DataMapper>,
    clock: LogClock,
    write_lock: Mutex<()>,
}

impl OfflineCache {
    /// Opens the cache `name` in `store`. `network` is used by `add`.
    pub fn open(name: &str, store: Arc<dyn Store>, network: Arc<dyn Fetch>) -> Result<Self> {
        let cache = OfflineCache {
            name: name.to_string(),
            collection: format!("{CACHE_COLLECTION_PREFIX}{name}"),
            store,
            network,
            data_mapper: None,
            clock: LogClock::system(),
            write_lock: Mutex::new(()),
        };
        for (_, record) in cache.records()? {
            cache.clock.observe(record.stamp);
        }
        Ok(cache)
    }

    /// Shreds JSON responses with `mapper` on `put`.
    pub fn with_data_mapper(mut self, mapper: DataMapper) -> Self {
        self.data_mapper = Some(mapper);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_mapper(&self) -> Option<&DataMapper> {
        self.data_mapper.as_ref()
    }

    /// Stored records in insertion order.
    fn records(&self) -> Result<Vec<(String, CacheRecord)>> {
        let mut records = load_all::<CacheRecord>(self.store.as_ref(), &self.collection)?;
        records.sort_by_key(|(_, record)| record.stamp);
        Ok(records)
    }

    fn matching(
        &self,
        request: Option<&Request>,
        options: MatchOptions,
    ) -> Result<Vec<(String, CacheRecord)>> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|(_, record)| request.map_or(true, |query| matches(record, query, options)))
            .collect())
    }

    /// Rebuilds the stored response, unshredding it if needed.
    fn materialize(&self, record: CacheRecord) -> Result<Response> {
        let (Some(shredded), Some(mapper)) = (&record.shredded, &self.data_mapper) else {
            return Ok(record.response);
        };

        let mut rows = Vec::with_capacity(shredded.keys.len());
        for key in &shredded.keys {
            if let Some(value) = self.store.get(&shredded.store_name, key)? {
                rows.push(ShreddedRow {
                    key: key.clone(),
                    value,
                });
            }
        }
        let data = ShreddedData {
            store_name: shredded.store_name.clone(),
            resource_type: shredded.resource_type,
            data: rows,
        };
        mapper.unshredder.unshred(&[data], record.response)
    }

    /// The first stored response matching `request`.
    pub fn match_request(&self, request: &Request, options: MatchOptions) -> Result<Option<Response>> {
        match self.matching(Some(request), options)?.into_iter().next() {
            Some((_, record)) => Ok(Some(self.materialize(record)?)),
            None => Ok(None),
        }
    }

    /// Every stored response matching `request`, or every response if `request` is `None`.
    pub fn match_all(&self, request: Option<&Request>, options: MatchOptions) -> Result<Vec<Response>> {
        self.matching(request, options)?
            .into_iter()
            .map(|(_, record)| self.materialize(record))
            .collect()
    }

    /// Returns true if any stored request matches, without rebuilding bodies.
    pub fn has_match(&self, request: &Request, options: MatchOptions) -> Result<bool> {
        Ok(self
            .records()?
            .iter()
            .any(|(_, record)| matches(record, request, options)))
    }

    /// Stored requests matching `request`, or all stored requests.
    pub fn keys(&self, request: Option<&Request>, options: MatchOptions) -> Result<Vec<Request>> {
        Ok(self
            .matching(request, options)?
            .into_iter()
            .map(|(_, record)| record.request)
            .collect())
    }

    /// Whether shredded rows can answer `request`, and as what.
    pub fn shredded_scope(&self, request: &Request) -> Result<Option<ShreddedScope>> {
        let url = resource_url(request);
        let parent = url.rsplit_once('/').map(|(parent, _)| parent);

        let mut scope = None;
        for (_, record) in self.records()? {
            if record.shredded.is_none() {
                continue;
            }
            let stored = resource_url(&record.request);
            if stored == url {
                return Ok(Some(ShreddedScope::Resource));
            }
            if parent == Some(stored.as_str()) {
                scope = Some(ShreddedScope::Item);
            }
        }
        Ok(scope)
    }

    /// Stores the pair, replacing every entry that matches `request`.
    pub fn put(&self, request: &Request, response: &Response) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let key = cache_key(request, response);

        let mut stored = response.clone();
        let mut shredded = None;
        if let Some(mapper) = &self.data_mapper {
            let data = match mapper.shredder.shred(&mapper.store_name, response) {
                Ok(data) => data,
                Err(Error::Shredding(reason)) => {
                    debug!(url = %request.url(), reason = %reason, "caching response unshredded");
                    None
                }
                Err(e) => return Err(e),
            };
            if let Some(data) = data {
                for row in &data.data {
                    self.store.upsert(&data.store_name, &row.key, &row.value)?;
                }
                debug!(
                    url = %request.url(),
                    store = %data.store_name,
                    rows = data.data.len(),
                    "shredded cached response"
                );
                stored = stored.with_body(Vec::new());
                shredded = Some(ShreddedRef {
                    keys: data.keys(),
                    store_name: data.store_name,
                    resource_type: data.resource_type,
                });
            }
        }

        for (existing, _) in self.matching(Some(request), MatchOptions::default())? {
            if existing != key {
                self.store.remove(&self.collection, &existing)?;
            }
        }

        let stamp = self.clock.now();
        let record = CacheRecord {
            request: request.clone(),
            response: stored,
            stamp,
            created_at: stamp.created_at(),
            shredded,
        };
        save(self.store.as_ref(), &self.collection, &key, &record)?;
        debug!(cache = %self.name, method = %request.method(), url = %request.url(), "cached response");
        Ok(())
    }

    /// Fetches `request` from the network and caches the response.
    ///
    /// Non-2xx responses are errors and are not cached.
    pub async fn add(&self, request: Request) -> Result<()> {
        let response = self.network.fetch(request.clone()).await?;
        if !response.ok() {
            return Err(Error::Network(format!(
                "{} {} responded with status {}",
                request.method(),
                request.url(),
                response.status()
            )));
        }
        self.put(&request, &response)
    }

    /// Adds every request concurrently. The first failure fails the whole call.
    pub async fn upsert_all(&self, requests: Vec<Request>) -> Result<()> {
        try_join_all(requests.into_iter().map(|request| self.add(request))).await?;
        Ok(())
    }

    /// Removes every entry matching `request`. Returns true if any was removed.
    ///
    /// Shredded rows no remaining entry references are removed too.
    pub fn delete(&self, request: &Request, options: MatchOptions) -> Result<bool> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut removed = false;
        let mut released = Vec::new();
        for (key, record) in self.matching(Some(request), options)? {
            if self.store.remove(&self.collection, &key)? {
                removed = true;
                released.extend(record.shredded);
            }
        }
        if !released.is_empty() {
            self.remove_unreferenced_rows(released)?;
        }
        Ok(removed)
    }

    fn remove_unreferenced_rows(&self, released: Vec<ShreddedRef>) -> Result<()> {
        let remaining = self.records()?;
        let referenced = |store_name: &str, key: &str| {
            remaining.iter().any(|(_, record)| {
                record.shredded.as_ref().is_some_and(|shredded| {
                    shredded.store_name == store_name && shredded.keys.iter().any(|k| k == key)
                })
            })
        };

        let mut rows = 0;
        for shredded in &released {
            for key in &shredded.keys {
                if !referenced(&shredded.store_name, key)
                    && self.store.remove(&shredded.store_name, key)?
                {
                    rows += 1;
                }
            }
        }
        debug!(cache = %self.name, rows, "removed shredded rows");
        Ok(())
    }

    /// Removes every entry and its shredded rows. Returns true only if all entries were removed.
    pub fn clear(&self) -> Result<bool> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let records = self.records()?;
        let expected = records.len();
        let removed = self.store.clear(&self.collection)?;
        if removed != expected {
            warn!(cache = %self.name, expected, removed, "cache clear removed fewer entries than stored");
        }
        let released: Vec<ShreddedRef> = records
            .into_iter()
            .filter_map(|(_, record)| record.shredded)
            .collect();
        if !released.is_empty() {
            self.remove_unreferenced_rows(released)?;
        }
        Ok(removed == expected)
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
