// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shredding and query collaborators.
//!
//! A [`Shredder`] decomposes a JSON response body into keyed rows stored in
//! a collection of the [`Store`]; an [`Unshredder`] rebuilds a body from
//! those rows. A [`QueryHandler`] answers a request from shredded rows
//! directly. The engine only depends on the traits; [`SimpleJsonShredding`]
//! and [`SimpleQueryHandler`] are reference implementations.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::http::{Request, Response, CONTENT_TYPE, JSON_CONTENT_TYPE};
use crate::store::Store;

/// Whether shredded rows came from a single object or a list of objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Single,
    Collection,
}

/// One shredded row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShreddedRow {
    pub key: String,
    pub value: Value,
}

/// Rows produced from one response body, destined for `store_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShreddedData {
    pub store_name: String,
    pub resource_type: ResourceType,
    pub data: Vec<ShreddedRow>,
}

impl ShreddedData {
    pub fn keys(&self) -> Vec<String> {
        self.data.iter().map(|row| row.key.clone()).collect()
    }
}

/// Decomposes response bodies into rows.
pub trait Shredder: Send + Sync {
    /// Returns `None` when the response carries nothing to shred.
    fn shred(&self, store_name: &str, response: &Response) -> Result<Option<ShreddedData>>;
}

/// Rebuilds response bodies from rows.
pub trait Unshredder: Send + Sync {
    /// Returns `response` with a body built from `data`.
    fn unshred(&self, data: &[ShreddedData], response: Response) -> Result<Response>;
}

/// Answers requests from shredded rows.
pub trait QueryHandler: Send + Sync {
    /// Returns the rows satisfying `request`, or `None` if the handler cannot answer it.
    fn query(
        &self,
        request: &Request,
        store: &dyn Store,
        store_name: &str,
    ) -> Result<Option<ShreddedData>>;
}

/// A shredder/unshredder pair bound to the collection their rows live in.
#[derive(Clone)]
pub struct DataMapper {
    pub store_name: String,
    pub shredder: Arc<dyn Shredder>,
    pub unshredder: Arc<dyn Unshredder>,
}

impl DataMapper {
    /// [`SimpleJsonShredding`] keyed on `id_field`, writing rows to `store_name`.
    pub fn simple_json(store_name: &str, id_field: &str) -> Self {
        let shredding = Arc::new(SimpleJsonShredding::new(id_field));
        DataMapper {
            store_name: store_name.to_string(),
            shredder: shredding.clone(),
            unshredder: shredding,
        }
    }
}

/// Shreds JSON objects by an id field.
///
/// Arrays become one row per element and a `Collection`; a lone object
/// becomes a `Single`. Non-JSON bodies and scalar JSON are not shredded.
#[derive(Debug, Clone)]
pub struct SimpleJsonShredding {
    id_field: String,
}

impl SimpleJsonShredding {
    pub fn new(id_field: &str) -> Self {
        SimpleJsonShredding {
            id_field: id_field.to_string(),
        }
    }

    /// The row key of an object, from its id field.
    pub fn row_key(&self, value: &Value) -> Result<String> {
        match value.get(&self.id_field) {
            Some(Value::String(key)) => Ok(key.clone()),
            Some(Value::Number(key)) => Ok(key.to_string()),
            _ => Err(Error::Shredding(format!(
                "object has no string or numeric '{}' field",
                self.id_field
            ))),
        }
    }

    fn row(&self, value: &Value) -> Result<ShreddedRow> {
        Ok(ShreddedRow {
            key: self.row_key(value)?,
            value: value.clone(),
        })
    }
}

impl Shredder for SimpleJsonShredding {
    fn shred(&self, store_name: &str, response: &Response) -> Result<Option<ShreddedData>> {
        if !response.is_json() || !response.has_body() {
            return Ok(None);
        }
        let body: Value = response
            .json()
            .map_err(|e| Error::Shredding(format!("response body is not JSON: {e}")))?;

        let (resource_type, data) = match &body {
            Value::Array(items) => (
                ResourceType::Collection,
                items
                    .iter()
                    .map(|item| self.row(item))
                    .collect::<Result<Vec<_>>>()?,
            ),
            Value::Object(_) => (ResourceType::Single, vec![self.row(&body)?]),
            _ => return Ok(None),
        };

        Ok(Some(ShreddedData {
            store_name: store_name.to_string(),
            resource_type,
            data,
        }))
    }
}

impl Unshredder for SimpleJsonShredding {
    fn unshred(&self, data: &[ShreddedData], response: Response) -> Result<Response> {
        if data.is_empty() {
            return Ok(response);
        }

        let collection = data
            .iter()
            .any(|shredded| shredded.resource_type == ResourceType::Collection);
        let mut values = data
            .iter()
            .flat_map(|shredded| shredded.data.iter().map(|row| row.value.clone()));

        let body = if collection {
            Value::Array(values.collect())
        } else {
            values.next().unwrap_or(Value::Null)
        };

        Ok(response
            .with_header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .with_body(serde_json::to_vec(&body)?))
    }
}

/// Answers a request by key lookup or query-parameter equality filter.
///
/// If the last path segment of the url is a stored key, that row is the
/// answer. Otherwise every row whose fields equal all query parameters is
/// returned; with no parameters that is the whole collection.
#[derive(Debug, Clone, Default)]
pub struct SimpleQueryHandler;

impl SimpleQueryHandler {
    pub fn new() -> Self {
        SimpleQueryHandler
    }
}

fn field_matches(value: &Value, field: &str, expected: &str) -> bool {
    match value.get(field) {
        Some(Value::String(s)) => s == expected,
        Some(other) => other.to_string() == expected,
        None => false,
    }
}

impl QueryHandler for SimpleQueryHandler {
    fn query(
        &self,
        request: &Request,
        store: &dyn Store,
        store_name: &str,
    ) -> Result<Option<ShreddedData>> {
        if let Some(segment) = request.last_path_segment() {
            if let Some(value) = store.get(store_name, &segment)? {
                return Ok(Some(ShreddedData {
                    store_name: store_name.to_string(),
                    resource_type: ResourceType::Single,
                    data: vec![ShreddedRow {
                        key: segment,
                        value,
                    }],
                }));
            }
        }

        let rows = store.entries(store_name)?;
        if rows.is_empty() {
            return Ok(None);
        }

        let params = request.query_pairs();
        let data = rows
            .into_iter()
            .filter(|(_, value)| {
                params
                    .iter()
                    .all(|(field, expected)| field_matches(value, field, expected))
            })
            .map(|(key, value)| ShreddedRow { key, value })
            .collect();

        Ok(Some(ShreddedData {
            store_name: store_name.to_string(),
            resource_type: ResourceType::Collection,
            data,
        }))
    }
}

#[cfg(test)]
#[path = "shred_tests.rs"]
mod tests;
