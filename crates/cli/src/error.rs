// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors that can occur in the offsync CLI.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'offsync init' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Core(#[from] offsync_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for offsync CLI operations.
pub type Result<T> = std::result::Result<T, Error>;
