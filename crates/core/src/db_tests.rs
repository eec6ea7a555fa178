// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::test_helpers::exercise_store;
use serde_json::json;
use tempfile::tempdir;

#[test]
fn sqlite_store_contract() {
    let store = SqliteStore::open_in_memory().unwrap();
    exercise_store(&store);
}

#[test]
fn sqlite_store_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("offsync.db");

    {
        let store = SqliteStore::open(&path).unwrap();
        store
            .upsert("sync_log", "1000-0", &json!({"url": "https://a/"}))
            .unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(
        store.get("sync_log", "1000-0").unwrap(),
        Some(json!({"url": "https://a/"}))
    );
}

#[test]
fn sqlite_store_upsert_replaces() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.upsert("c", "k", &json!(1)).unwrap();
    store.upsert("c", "k", &json!(2)).unwrap();

    assert_eq!(store.get("c", "k").unwrap(), Some(json!(2)));
    assert_eq!(store.keys("c").unwrap().len(), 1);
}

#[test]
fn sqlite_store_reports_corrupted_rows() {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .conn()
        .execute(
            "INSERT INTO records (collection, key, value, updated_at) VALUES ('c', 'k', 'not json', '')",
            [],
        )
        .unwrap();

    assert!(matches!(store.get("c", "k"), Err(Error::CorruptedData(_))));
    assert!(matches!(store.entries("c"), Err(Error::CorruptedData(_))));
}
