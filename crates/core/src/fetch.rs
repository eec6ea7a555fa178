// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for issuing requests.
//!
//! Provides a trait-based fetch layer that enables:
//! - Real HTTP requests for production ([`HttpFetcher`])
//! - Interception middleware composed over another fetcher
//! - Mock fetchers for unit testing

use futures_util::future::BoxFuture;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::http::{Headers, Request, Response};

/// Anything that can turn a request into a response.
pub trait Fetch: Send + Sync {
    /// Issue the request.
    ///
    /// Transport failures are errors; any HTTP status is a response.
    fn fetch(&self, request: Request) -> BoxFuture<'_, Result<Response>>;
}

/// HTTP fetcher backed by reqwest.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with an optional overall request timeout.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Network(format!("failed to build http client: {e}")))?;
        Ok(HttpFetcher { client })
    }

    /// Create a fetcher around an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        HttpFetcher { client }
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, request: Request) -> BoxFuture<'_, Result<Response>> {
        Box::pin(async move {
            let method = reqwest::Method::from_bytes(request.method().as_str().as_bytes())
                .map_err(|e| Error::Network(e.to_string()))?;

            let mut builder = self.client.request(method, request.url());
            for (name, value) in request.headers().iter() {
                builder = builder.header(name, value);
            }
            if request.has_body() {
                builder = builder.body(request.bytes().to_vec());
            }

            debug!(method = %request.method(), url = %request.url(), "network fetch");
            let reply = builder
                .send()
                .await
                .map_err(|e| Error::Network(e.to_string()))?;

            let status = reply.status();
            let url = reply.url().to_string();
            let headers: Headers = reply
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.as_str().to_string(), value.to_string()))
                })
                .collect();
            let body = reply
                .bytes()
                .await
                .map_err(|e| Error::Network(e.to_string()))?;

            Ok(Response::new(status.as_u16(), body.to_vec())
                .with_status_text(status.canonical_reason().unwrap_or_default())
                .with_url(url)
                .with_headers(headers))
        })
    }
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
