// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Storage collaborator contract.
//!
//! A [`Store`] holds named collections of JSON values keyed by string, the
//! shape of an IndexedDB-like object store. The offline cache, the sync log
//! and shredded rows all live in collections of one store. [`SqliteStore`]
//! is durable; [`MemoryStore`] is not.
//!
//! [`SqliteStore`]: crate::db::SqliteStore

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::Result;

/// Key-value storage with named collections.
///
/// Implementations are internally synchronized; every call is atomic with
/// respect to other calls on the same store.
pub trait Store: Send + Sync {
    /// Reads the value stored under `key`.
    fn get(&self, collection: &str, key: &str) -> Result<Option<Value>>;

    /// Inserts or replaces the value stored under `key`.
    fn upsert(&self, collection: &str, key: &str, value: &Value) -> Result<()>;

    /// Removes `key`. Returns true if it existed.
    fn remove(&self, collection: &str, key: &str) -> Result<bool>;

    /// All keys of a collection, ascending.
    fn keys(&self, collection: &str) -> Result<Vec<String>>;

    /// All entries of a collection, ascending by key.
    fn entries(&self, collection: &str) -> Result<Vec<(String, Value)>>;

    /// Removes every entry of a collection. Returns the number removed.
    fn clear(&self, collection: &str) -> Result<usize>;
}

/// Reads and deserializes a value.
pub fn load<T: DeserializeOwned>(store: &dyn Store, collection: &str, key: &str) -> Result<Option<T>> {
    match store.get(collection, key)? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Serializes and writes a value.
pub fn save<T: Serialize>(store: &dyn Store, collection: &str, key: &str, value: &T) -> Result<()> {
    let value = serde_json::to_value(value)?;
    store.upsert(collection, key, &value)
}

/// Reads and deserializes every entry of a collection.
pub fn load_all<T: DeserializeOwned>(store: &dyn Store, collection: &str) -> Result<Vec<(String, T)>> {
    store
        .entries(collection)?
        .into_iter()
        .map(|(key, value)| Ok((key, serde_json::from_value(value)?)))
        .collect()
}

/// Non-durable store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<BTreeMap<String, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        let collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        Ok(collections
            .get(collection)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    fn upsert(&self, collection: &str, key: &str, value: &Value) -> Result<()> {
        let mut collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    fn remove(&self, collection: &str, key: &str) -> Result<bool> {
        let mut collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        Ok(collections
            .get_mut(collection)
            .map(|entries| entries.remove(key).is_some())
            .unwrap_or(false))
    }

    fn keys(&self, collection: &str) -> Result<Vec<String>> {
        let collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        Ok(collections
            .get(collection)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn entries(&self, collection: &str) -> Result<Vec<(String, Value)>> {
        let collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        Ok(collections
            .get(collection)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn clear(&self, collection: &str) -> Result<usize> {
        let mut collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        Ok(collections
            .remove(collection)
            .map(|entries| entries.len())
            .unwrap_or(0))
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
