// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Undo/redo records for local shredded-store mutations.
//!
//! When a mutating request is queued while offline, its effect on the local
//! shredded rows is recorded as [`UndoRedoData`]: the value each key held
//! before (`undo`) and after (`redo`). Undo restores the earlier values,
//! redo reapplies the later ones.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::store::Store;

/// The kind of mutation recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UndoRedoOperation {
    Upsert,
    Remove,
}

/// Before and after values of one key. `None` means the key was absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoRedoItem {
    pub key: String,
    #[serde(default)]
    pub undo: Option<Value>,
    #[serde(default)]
    pub redo: Option<Value>,
}

/// Mutations of one collection tied to a queued request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoRedoData {
    pub operation: UndoRedoOperation,
    pub store_name: String,
    pub undo_redo_data: Vec<UndoRedoItem>,
}

impl UndoRedoData {
    /// An upsert of `key` from `before` to `after`.
    pub fn upsert(store_name: &str, key: &str, before: Option<Value>, after: Value) -> Self {
        UndoRedoData {
            operation: UndoRedoOperation::Upsert,
            store_name: store_name.to_string(),
            undo_redo_data: vec![UndoRedoItem {
                key: key.to_string(),
                undo: before,
                redo: Some(after),
            }],
        }
    }

    /// A removal of `key`, which held `before`.
    pub fn remove(store_name: &str, key: &str, before: Option<Value>) -> Self {
        UndoRedoData {
            operation: UndoRedoOperation::Remove,
            store_name: store_name.to_string(),
            undo_redo_data: vec![UndoRedoItem {
                key: key.to_string(),
                undo: before,
                redo: None,
            }],
        }
    }
}

fn write(store: &dyn Store, store_name: &str, key: &str, value: Option<&Value>) -> Result<()> {
    match value {
        Some(value) => store.upsert(store_name, key, value),
        None => store.remove(store_name, key).map(|_| ()),
    }
}

/// Restores the values recorded before the mutations, newest first.
///
/// Returns true if there was anything to undo.
pub fn apply_undo(store: &dyn Store, data: &[UndoRedoData]) -> Result<bool> {
    let mut applied = false;
    for entry in data.iter().rev() {
        for item in entry.undo_redo_data.iter().rev() {
            write(store, &entry.store_name, &item.key, item.undo.as_ref())?;
            applied = true;
        }
    }
    if applied {
        debug!(entries = data.len(), "applied undo");
    }
    Ok(applied)
}

/// Reapplies the recorded mutations in order.
///
/// Returns true if there was anything to redo.
pub fn apply_redo(store: &dyn Store, data: &[UndoRedoData]) -> Result<bool> {
    let mut applied = false;
    for entry in data {
        for item in &entry.undo_redo_data {
            let value = match entry.operation {
                UndoRedoOperation::Upsert => item.redo.as_ref(),
                UndoRedoOperation::Remove => None,
            };
            write(store, &entry.store_name, &item.key, value)?;
            applied = true;
        }
    }
    if applied {
        debug!(entries = data.len(), "applied redo");
    }
    Ok(applied)
}

#[cfg(test)]
#[path = "undo_tests.rs"]
mod tests;
