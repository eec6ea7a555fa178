// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Fetch interception middleware.
//!
//! The [`Interceptor`] wraps the real network fetcher. For each request it
//! looks up the first registration whose scope matches the url and dispatches
//! a fetch event to that registration's listeners. A listener response is
//! returned as-is; otherwise the request falls through to the network.

use futures_util::future::BoxFuture;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::fetch::Fetch;
use crate::http::{Request, Response};
use crate::registration::RegistrationTable;

/// Fetcher that routes matching requests through registration listeners.
pub struct Interceptor {
    registrations: Arc<RegistrationTable>,
    network: Arc<dyn Fetch>,
}

impl Interceptor {
    pub fn new(registrations: Arc<RegistrationTable>, network: Arc<dyn Fetch>) -> Self {
        Interceptor {
            registrations,
            network,
        }
    }

    async fn route(&self, request: Request) -> Result<Response> {
        let Some(registration) = self.registrations.find(request.url()) else {
            debug!(url = %request.url(), "no registration, passing through");
            return self.network.fetch(request).await;
        };

        match registration.dispatch_fetch(&request).await? {
            Some(response) => {
                debug!(
                    registration = %registration.id(),
                    url = %request.url(),
                    status = response.status(),
                    "answered by listener"
                );
                Ok(response)
            }
            None => self.network.fetch(request).await,
        }
    }
}

impl Fetch for Interceptor {
    fn fetch(&self, request: Request) -> BoxFuture<'_, Result<Response>> {
        Box::pin(self.route(request))
    }
}

#[cfg(test)]
#[path = "intercept_tests.rs"]
mod tests;
