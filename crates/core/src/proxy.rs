// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Cache-if-offline fetch listener.
//!
//! Online, requests go to the network and successful `GET` responses are
//! cached. Offline (or when the network fails):
//! - `GET` for a shredded resource, or an item below one, is answered from
//!   the rows through the query handler; other `GET`s come from the cache,
//!   else a synthesized 503
//! - mutating requests are applied to the shredded rows, queued in the sync
//!   log with their undo/redo data, and answered with a synthesized 200

use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::{MatchOptions, OfflineCache, ShreddedScope};
use crate::error::{Error, Result};
use crate::fetch::Fetch;
use crate::http::{Method, Request, Response};
use crate::manager::Connectivity;
use crate::registration::{ListenerId, ListenerOutcome, Registration, RegistrationEvent, FETCH_EVENT};
use crate::shred::{DataMapper, QueryHandler, ResourceType};
use crate::store::Store;
use crate::sync::{InsertOptions, SyncManager};
use crate::undo::UndoRedoData;

/// Header carrying the sync log id of a request queued by the proxy.
pub const QUEUED_HEADER: &str = "x-offsync-queued";

/// Default fetch listener.
pub struct ResponseProxy {
    connectivity: Arc<Connectivity>,
    network: Arc<dyn Fetch>,
    cache: Arc<OfflineCache>,
    sync: Arc<SyncManager>,
    store: Arc<dyn Store>,
    query_handler: Option<Arc<dyn QueryHandler>>,
}

impl ResponseProxy {
    pub(crate) fn new(
        connectivity: Arc<Connectivity>,
        network: Arc<dyn Fetch>,
        cache: Arc<OfflineCache>,
        sync: Arc<SyncManager>,
        store: Arc<dyn Store>,
        query_handler: Option<Arc<dyn QueryHandler>>,
    ) -> Self {
        ResponseProxy {
            connectivity,
            network,
            cache,
            sync,
            store,
            query_handler,
        }
    }

    /// Installs the proxy as a fetch listener of `registration`.
    pub fn attach(self: &Arc<Self>, registration: &Registration) -> ListenerId {
        let proxy = Arc::clone(self);
        registration.add_event_listener(FETCH_EVENT, move |event| {
            let proxy = Arc::clone(&proxy);
            async move {
                match event {
                    RegistrationEvent::Fetch(request) => {
                        Ok(ListenerOutcome::Respond(proxy.process_request(request).await?))
                    }
                    RegistrationEvent::Custom { .. } => Ok(ListenerOutcome::Continue),
                }
            }
        })
    }

    /// Answers a request according to the current connectivity.
    pub async fn process_request(&self, request: Request) -> Result<Response> {
        if self.connectivity.is_online() {
            match self.network.fetch(request.clone()).await {
                Ok(response) => {
                    if request.method() == Method::Get && response.ok() {
                        self.cache.put(&request, &response)?;
                    }
                    return Ok(response);
                }
                Err(Error::Network(reason)) => {
                    debug!(url = %request.url(), reason = %reason, "network failed, answering offline");
                }
                Err(e) => return Err(e),
            }
        }

        if request.method().is_mutating() {
            self.queue(request)
        } else {
            self.answer_offline(&request)
        }
    }

    fn answer_offline(&self, request: &Request) -> Result<Response> {
        if let Some(response) = self.answer_from_rows(request)? {
            return Ok(response);
        }

        if let Some(response) = self.cache.match_request(request, MatchOptions::default())? {
            debug!(url = %request.url(), "answered from cache");
            return Ok(response);
        }

        debug!(url = %request.url(), "nothing cached");
        Ok(Response::service_unavailable().with_url(request.url()))
    }

    fn answer_from_rows(&self, request: &Request) -> Result<Option<Response>> {
        let (Some(handler), Some(mapper)) = (&self.query_handler, self.cache.data_mapper()) else {
            return Ok(None);
        };
        let Some(scope) = self.cache.shredded_scope(request)? else {
            return Ok(None);
        };
        let Some(data) = handler.query(request, self.store.as_ref(), &mapper.store_name)? else {
            return Ok(None);
        };
        // An item url answers with its row or not at all
        if scope == ShreddedScope::Item && data.resource_type != ResourceType::Single {
            return Ok(None);
        }

        debug!(url = %request.url(), rows = data.data.len(), "answered from shredded rows");
        let response = Response::new(200, Vec::new()).with_url(request.url());
        Ok(Some(mapper.unshredder.unshred(&[data], response)?))
    }

    fn queue(&self, request: Request) -> Result<Response> {
        let undo_redo = match self.cache.data_mapper() {
            Some(mapper) => self.apply_locally(mapper, &request)?,
            None => Vec::new(),
        };

        let echo = Response::new(200, request.bytes().to_vec())
            .with_url(request.url())
            .with_headers(request.headers().clone());
        let request_id = self
            .sync
            .insert_request(request, InsertOptions { undo_redo })?;
        info!(request_id = %request_id, "queued offline request");

        Ok(echo.with_header(QUEUED_HEADER, request_id))
    }

    /// Applies a mutating request to the shredded rows, returning how to undo it.
    fn apply_locally(&self, mapper: &DataMapper, request: &Request) -> Result<Vec<UndoRedoData>> {
        let store_name = mapper.store_name.as_str();

        if request.method() == Method::Delete {
            let Some(key) = request.last_path_segment() else {
                return Ok(Vec::new());
            };
            let before = self.store.get(store_name, &key)?;
            if before.is_none() {
                return Ok(Vec::new());
            }
            self.store.remove(store_name, &key)?;
            return Ok(vec![UndoRedoData::remove(store_name, &key, before)]);
        }

        let body = Response::new(200, request.bytes().to_vec()).with_headers(request.headers().clone());
        let shredded = match mapper.shredder.shred(store_name, &body) {
            Ok(Some(shredded)) => shredded,
            Ok(None) => return Ok(Vec::new()),
            Err(Error::Shredding(reason)) => {
                debug!(url = %request.url(), reason = %reason, "request body not applied locally");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let mut undo_redo = Vec::with_capacity(shredded.data.len());
        for row in shredded.data {
            let before = self.store.get(store_name, &row.key)?;
            self.store.upsert(store_name, &row.key, &row.value)?;
            undo_redo.push(UndoRedoData::upsert(store_name, &row.key, before, row.value));
        }
        Ok(undo_redo)
    }
}

#[cfg(test)]
#[path = "proxy_tests.rs"]
mod tests;
