// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence manager: the context object wiring the engine together.
//!
//! One [`PersistenceManager`] owns the registration table, the offline cache,
//! the sync manager and the connectivity state. It is constructed once and
//! passed by reference; independent instances do not share state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{OfflineCache, DEFAULT_CACHE_NAME};
use crate::clock::LogClock;
use crate::error::{Error, Result};
use crate::fetch::{Fetch, HttpFetcher};
use crate::http::{Request, Response};
use crate::intercept::Interceptor;
use crate::proxy::ResponseProxy;
use crate::registration::{Registration, RegistrationId, RegistrationTable, Scope};
use crate::shred::{DataMapper, QueryHandler, SimpleQueryHandler};
use crate::store::Store;
use crate::sync::SyncManager;

/// Online/offline state.
///
/// Online means the environment reports connectivity and offline mode is
/// not forced.
#[derive(Debug, Default)]
pub struct Connectivity {
    offline: AtomicBool,
    forced_offline: AtomicBool,
}

impl Connectivity {
    pub fn is_online(&self) -> bool {
        !self.offline.load(Ordering::SeqCst) && !self.forced_offline.load(Ordering::SeqCst)
    }

    /// Records connectivity reported by the environment.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Manual override; takes precedence over the environment.
    pub fn force_offline(&self, forced: bool) {
        self.forced_offline.store(forced, Ordering::SeqCst);
    }
}

/// Options for [`PersistenceManager::register`].
#[derive(Debug, Clone)]
pub struct RegisterOptions {
    pub scope: Scope,
}

impl RegisterOptions {
    pub fn new(scope: impl Into<Scope>) -> Self {
        RegisterOptions {
            scope: scope.into(),
        }
    }
}

/// Result of [`PersistenceManager::register`].
#[derive(Debug)]
pub enum Registered {
    /// A new registration for the given scope.
    Created(Arc<Registration>),
    /// No options were given; the existing registrations.
    Existing(Vec<Arc<Registration>>),
}

/// Builds a [`PersistenceManager`].
pub struct PersistenceManagerBuilder {
    store: Arc<dyn Store>,
    network: Option<Arc<dyn Fetch>>,
    cache_name: String,
    data_mapper: Option<DataMapper>,
    clock: Option<LogClock>,
}

impl PersistenceManagerBuilder {
    /// Transport for unintercepted requests. Defaults to [`HttpFetcher`].
    pub fn network(mut self, network: Arc<dyn Fetch>) -> Self {
        self.network = Some(network);
        self
    }

    pub fn cache_name(mut self, name: &str) -> Self {
        self.cache_name = name.to_string();
        self
    }

    /// Shred cached JSON responses with `mapper`.
    pub fn data_mapper(mut self, mapper: DataMapper) -> Self {
        self.data_mapper = Some(mapper);
        self
    }

    /// Clock issuing sync log ids.
    pub fn clock(mut self, clock: LogClock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<PersistenceManager> {
        let network: Arc<dyn Fetch> = match self.network {
            Some(network) => network,
            None => Arc::new(HttpFetcher::new(None)?),
        };

        let mut cache = OfflineCache::open(&self.cache_name, Arc::clone(&self.store), Arc::clone(&network))?;
        if let Some(mapper) = self.data_mapper {
            cache = cache.with_data_mapper(mapper);
        }
        let sync = SyncManager::with_clock(
            Arc::clone(&self.store),
            Arc::clone(&network),
            self.clock.unwrap_or_default(),
        )?;

        Ok(PersistenceManager {
            store: self.store,
            network,
            registrations: Arc::new(RegistrationTable::new()),
            cache: Arc::new(cache),
            sync: Arc::new(sync),
            connectivity: Arc::new(Connectivity::default()),
            interceptor: OnceLock::new(),
        })
    }
}

/// The offline persistence engine.
pub struct PersistenceManager {
    store: Arc<dyn Store>,
    network: Arc<dyn Fetch>,
    registrations: Arc<RegistrationTable>,
    cache: Arc<OfflineCache>,
    sync: Arc<SyncManager>,
    connectivity: Arc<Connectivity>,
    interceptor: OnceLock<Arc<Interceptor>>,
}

impl PersistenceManager {
    pub fn builder(store: Arc<dyn Store>) -> PersistenceManagerBuilder {
        PersistenceManagerBuilder {
            store,
            network: None,
            cache_name: DEFAULT_CACHE_NAME.to_string(),
            data_mapper: None,
            clock: None,
        }
    }

    /// Installs the interception middleware. Safe to call more than once.
    pub fn init(&self) {
        self.interceptor.get_or_init(|| {
            info!("persistence manager initialized");
            Arc::new(Interceptor::new(
                Arc::clone(&self.registrations),
                Arc::clone(&self.network),
            ))
        });
    }

    pub fn is_initialized(&self) -> bool {
        self.interceptor.get().is_some()
    }

    /// The intercepting fetcher, for composing into other code.
    pub fn fetcher(&self) -> Result<Arc<dyn Fetch>> {
        let interceptor = self.interceptor.get().ok_or(Error::NotInitialized)?;
        Ok(Arc::clone(interceptor) as Arc<dyn Fetch>)
    }

    /// Issues a request through the registrations.
    pub async fn fetch(&self, request: Request) -> Result<Response> {
        let interceptor = self.interceptor.get().ok_or(Error::NotInitialized)?;
        interceptor.fetch(request).await
    }

    /// Issues a request straight to the network, bypassing every registration.
    pub async fn browser_fetch(&self, request: Request) -> Result<Response> {
        self.network.fetch(request).await
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    pub fn force_offline(&self, forced: bool) {
        debug!(forced, "force offline");
        self.connectivity.force_offline(forced);
    }

    /// Records environment connectivity.
    pub fn set_offline(&self, offline: bool) {
        self.connectivity.set_offline(offline);
    }

    /// Follows environment connectivity reported on `online` until the sender is dropped.
    pub fn watch_connectivity(&self, mut online: watch::Receiver<bool>) -> JoinHandle<()> {
        let connectivity = Arc::clone(&self.connectivity);
        connectivity.set_offline(!*online.borrow());
        tokio::spawn(async move {
            while online.changed().await.is_ok() {
                let is_online = *online.borrow_and_update();
                connectivity.set_offline(!is_online);
                info!(online = is_online, "connectivity changed");
            }
        })
    }

    /// Creates a registration, or with no options returns the existing ones.
    pub fn register(&self, options: Option<RegisterOptions>) -> Registered {
        match options {
            Some(options) => {
                let registration = self.registrations.register(options.scope);
                debug!(registration = %registration.id(), scope = %registration.scope(), "registered");
                Registered::Created(registration)
            }
            None => Registered::Existing(self.registrations.all()),
        }
    }

    /// The first registration whose scope matches `url`.
    pub fn get_registration(&self, url: &str) -> Option<Arc<Registration>> {
        self.registrations.find(url)
    }

    /// Snapshot of every registration.
    pub fn get_registrations(&self) -> Vec<Arc<Registration>> {
        self.registrations.all()
    }

    pub fn unregister(&self, id: RegistrationId) -> bool {
        self.registrations.unregister(id)
    }

    pub fn get_cache(&self) -> Arc<OfflineCache> {
        Arc::clone(&self.cache)
    }

    pub fn get_sync_manager(&self) -> Arc<SyncManager> {
        Arc::clone(&self.sync)
    }

    /// A cache-if-offline proxy answering offline `GET`s with [`SimpleQueryHandler`].
    pub fn response_proxy(&self) -> Arc<ResponseProxy> {
        self.response_proxy_with(Some(Arc::new(SimpleQueryHandler::new())))
    }

    /// A cache-if-offline proxy with a custom query handler, or none.
    pub fn response_proxy_with(&self, query_handler: Option<Arc<dyn QueryHandler>>) -> Arc<ResponseProxy> {
        Arc::new(ResponseProxy::new(
            Arc::clone(&self.connectivity),
            Arc::clone(&self.network),
            Arc::clone(&self.cache),
            Arc::clone(&self.sync),
            Arc::clone(&self.store),
            query_handler,
        ))
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
