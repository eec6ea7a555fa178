// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for offsync-core operations.

use thiserror::Error;

/// All possible errors that can occur in offsync-core operations.
///
/// Absence is not failure: lookups that find nothing return `None` or
/// `false` instead of an error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid url: '{0}'\n  hint: requests need an absolute url such as https://host/path")]
    InvalidUrl(String),

    #[error("invalid method: '{0}'\n  hint: valid methods are: GET, HEAD, POST, PUT, PATCH, DELETE, OPTIONS")]
    InvalidMethod(String),

    #[error("invalid scope pattern '{pattern}': {reason}")]
    InvalidScope { pattern: String, reason: String },

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("invalid request id: '{0}'")]
    InvalidRequestId(String),

    #[error("unknown sync event type: '{0}'\n  hint: valid types are: beforeSyncRequest, syncRequest, afterSyncRequest")]
    InvalidEventType(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("preflight OPTIONS request to {url} timed out after {timeout_ms}ms")]
    PreflightTimeout { url: String, timeout_ms: u64 },

    #[error("preflight OPTIONS request to {url} failed: {reason}")]
    PreflightFailed { url: String, reason: String },

    #[error("replay of request {request_id} failed: {reason}")]
    ReplayFailed {
        request_id: String,
        reason: String,
        status: Option<u16>,
    },

    #[error("sync already in progress\n  hint: wait for the running sync to finish")]
    SyncInProgress,

    #[error("persistence manager is not initialized\n  hint: call init() before issuing requests")]
    NotInitialized,

    #[error("shredding error: {0}")]
    Shredding(String),

    #[error("listener error: {0}")]
    Listener(String),

    #[error("body is not valid utf-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

impl Error {
    /// HTTP status equivalent of the error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::PreflightTimeout { .. } => Some(504),
            Error::ReplayFailed { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns true if the failed work is still queued and a later sync may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::ReplayFailed { .. }
                | Error::Network(_)
                | Error::PreflightTimeout { .. }
                | Error::PreflightFailed { .. }
        )
    }
}

/// A specialized Result type for offsync-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
