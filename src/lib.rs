// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod articles;
pub mod cache;
pub mod config;
pub mod enrich;
pub mod error;
pub mod lookup;
pub mod metrics;
pub mod model;
pub mod reports;
pub mod resolver;
pub mod store;

// Background launch/event sync
pub mod sync;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tracing::info;

pub use crate::api::{router, AppState};
pub use crate::cache::{CacheKey, LookupCache};
pub use crate::config::AppConfig;
pub use crate::error::{ApiError, ResolveError, StoreError, SyncError};
pub use crate::store::InMemoryStore;
pub use crate::sync::{SyncOutcome, SyncReport, SyncWorker};

/// Everything the binary needs after wiring.
pub struct App {
    pub router: Router,
    pub worker: Arc<SyncWorker>,
    pub store: Arc<InMemoryStore>,
    pub cache: Arc<LookupCache>,
}

/// Wire store, cache, read services and sync worker from config. Does not
/// spawn anything.
pub fn build_app(cfg: &AppConfig) -> anyhow::Result<App> {
    let store = match &cfg.seed_path {
        Some(path) => Arc::new(InMemoryStore::load_from_file(path)?),
        None => Arc::new(InMemoryStore::new()),
    };

    let cache = Arc::new(LookupCache::new(cfg.cache.capacity));

    let state = AppState::from_store(store.clone(), cache.clone(), cfg.lookup_ttls());
    let router = api::router(state);

    let upstream =
        sync::UpstreamClient::new(&cfg.ll_url, cfg.ll_token.clone(), cfg.upstream_timeout())
            .context("building upstream http client")?;
    let worker = Arc::new(SyncWorker::new(
        Arc::new(upstream),
        store.clone(),
        cfg.sync.page_size,
    ));

    info!(
        ll_url = %cfg.ll_url,
        token_set = cfg.ll_token.is_some(),
        seeded = cfg.seed_path.is_some(),
        "app wired"
    );

    Ok(App {
        router,
        worker,
        store,
        cache,
    })
}
