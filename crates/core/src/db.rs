// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed durable [`Store`].
//!
//! All collections share one table; values are JSON text. The sync log and
//! offline cache written through this store survive process restarts.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::store::Store;

/// SQL schema for the record store.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    collection TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (collection, key)
);

CREATE INDEX IF NOT EXISTS idx_records_collection ON records(collection);
"#;

/// Parse a stored JSON value, reporting the offending row on failure.
fn parse_value(raw: &str, collection: &str, key: &str) -> Result<Value> {
    serde_json::from_str(raw).map_err(|e| {
        Error::CorruptedData(format!(
            "invalid JSON for key '{key}' in collection '{collection}': {e}"
        ))
    })
}

/// Durable store over a single SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open a store at the given path, creating the file and schema if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        conn.execute_batch(SCHEMA)?;

        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Store for SqliteStore {
    fn get(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        let conn = self.conn();
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM records WHERE collection = ?1 AND key = ?2",
                params![collection, key],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|raw| parse_value(&raw, collection, key))
            .transpose()
    }

    fn upsert(&self, collection: &str, key: &str, value: &Value) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.conn().execute(
            "INSERT INTO records (collection, key, value, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(collection, key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = excluded.updated_at",
            params![collection, key, raw, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&self, collection: &str, key: &str) -> Result<bool> {
        let removed = self.conn().execute(
            "DELETE FROM records WHERE collection = ?1 AND key = ?2",
            params![collection, key],
        )?;
        Ok(removed > 0)
    }

    fn keys(&self, collection: &str) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT key FROM records WHERE collection = ?1 ORDER BY key")?;
        let keys = stmt
            .query_map(params![collection], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    fn entries(&self, collection: &str) -> Result<Vec<(String, Value)>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT key, value FROM records WHERE collection = ?1 ORDER BY key")?;
        let rows = stmt
            .query_map(params![collection], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(key, raw)| {
                let value = parse_value(&raw, collection, &key)?;
                Ok((key, value))
            })
            .collect()
    }

    fn clear(&self, collection: &str) -> Result<usize> {
        let removed = self.conn().execute(
            "DELETE FROM records WHERE collection = ?1",
            params![collection],
        )?;
        Ok(removed)
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
