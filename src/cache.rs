//! # Lookup Cache
//! In-process TTL cache shared by all request handlers, backed by
//! `moka::future::Cache`.
//!
//! - Every entry carries its own TTL, so verified-empty results (negative
//!   cache) can live shorter or longer than real results.
//! - Expired entries are never returned and are reclaimed by moka's own
//!   housekeeping; nothing needs to sweep them.
//! - An empty value is a valid entry; absence means "unknown".
//! - Optional capacity bound maps to moka's `max_capacity`.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache;
use moka::Expiry;

use crate::model::{EnrichedArticle, ResourceKind};

/// Cache key namespaced by resource kind, so a launch id can never collide
/// with an event id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: ResourceKind,
    pub id: String,
}

impl CacheKey {
    pub fn launch(id: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::Launch,
            id: id.into(),
        }
    }

    pub fn event(id: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::Event,
            id: id.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Enriched articles for one launch/event id. Shared via `Arc` so a hit
/// never deep-copies the list.
#[derive(Clone)]
struct Cached {
    articles: Arc<Vec<EnrichedArticle>>,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<CacheKey, Cached> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        value: &Cached,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    // An overwrite restarts the clock with the new value's TTL.
    fn expire_after_update(
        &self,
        _key: &CacheKey,
        value: &Cached,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

#[derive(Clone)]
pub struct LookupCache {
    inner: Cache<CacheKey, Cached>,
}

impl LookupCache {
    pub fn new(max_capacity: Option<u64>) -> Self {
        let mut builder = Cache::builder().expire_after(PerEntryTtl);
        if let Some(cap) = max_capacity {
            builder = builder.max_capacity(cap);
        }
        Self {
            inner: builder.build(),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Arc<Vec<EnrichedArticle>>> {
        self.inner.get(key).await.map(|c| c.articles)
    }

    pub async fn insert(&self, key: CacheKey, articles: Arc<Vec<EnrichedArticle>>, ttl: Duration) {
        self.inner.insert(key, Cached { articles, ttl }).await;
    }

    /// Approximate entry count; exact after [`Self::run_pending_tasks`].
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Flush moka's pending writes and evictions, expired entries included.
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }
}
