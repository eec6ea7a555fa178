// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::test_helpers::exercise_store;
use serde::Deserialize;
use serde_json::json;

#[test]
fn memory_store_contract() {
    exercise_store(&MemoryStore::new());
}

#[test]
fn memory_store_collections_are_isolated() {
    let store = MemoryStore::new();
    store.upsert("a", "k", &json!(1)).unwrap();
    store.upsert("b", "k", &json!(2)).unwrap();

    assert_eq!(store.clear("a").unwrap(), 1);
    assert_eq!(store.get("a", "k").unwrap(), None);
    assert_eq!(store.get("b", "k").unwrap(), Some(json!(2)));
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Item {
    id: u32,
    name: String,
}

#[test]
fn typed_helpers_round_trip() {
    let store = MemoryStore::new();
    let item = Item {
        id: 7,
        name: "seven".into(),
    };

    save(&store, "items", "7", &item).unwrap();
    let loaded: Option<Item> = load(&store, "items", "7").unwrap();
    assert_eq!(loaded, Some(item));

    let missing: Option<Item> = load(&store, "items", "8").unwrap();
    assert!(missing.is_none());
}

#[test]
fn load_all_reports_bad_shape() {
    let store = MemoryStore::new();
    store.upsert("items", "1", &json!({"unexpected": true})).unwrap();

    let result: Result<Vec<(String, Item)>> = load_all(&store, "items");
    assert!(result.is_err());
}
