// src/lookup.rs
//! Cached "articles per launch/event" lookups.
//!
//! The store query behind these is a scan over nested reference arrays and
//! is very slow, so every outcome is cached, including "no articles"
//! (negative cache). A cached empty list short-circuits to not-found until
//! it expires. Two concurrent misses for the same key may both hit the
//! store; the second write simply overwrites the first.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tracing::debug;

use crate::cache::{CacheKey, LookupCache};
use crate::enrich::EntityEnricher;
use crate::error::ApiError;
use crate::model::{EnrichedArticle, ResourceKind};
use crate::store::{ArticleStore, ListQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTtls {
    /// TTL for a non-empty result.
    pub positive: Duration,
    /// TTL for a verified-empty result.
    pub negative: Duration,
}

impl Default for LookupTtls {
    fn default() -> Self {
        Self {
            positive: Duration::from_secs(3600),
            negative: Duration::from_secs(3600),
        }
    }
}

#[derive(Clone)]
pub struct CachedLookupService {
    store: Arc<dyn ArticleStore>,
    enricher: EntityEnricher,
    cache: Arc<LookupCache>,
    ttls: LookupTtls,
}

impl CachedLookupService {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        enricher: EntityEnricher,
        cache: Arc<LookupCache>,
        ttls: LookupTtls,
    ) -> Self {
        Self {
            store,
            enricher,
            cache,
            ttls,
        }
    }

    pub async fn find_by_launch(
        &self,
        launch_id: &str,
    ) -> Result<Arc<Vec<EnrichedArticle>>, ApiError> {
        self.lookup(ResourceKind::Launch, launch_id).await
    }

    pub async fn find_by_event(
        &self,
        event_id: &str,
    ) -> Result<Arc<Vec<EnrichedArticle>>, ApiError> {
        self.lookup(ResourceKind::Event, event_id).await
    }

    async fn lookup(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> Result<Arc<Vec<EnrichedArticle>>, ApiError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ApiError::Validation(format!("{kind} id must not be empty")));
        }
        let key = CacheKey {
            kind,
            id: id.to_string(),
        };

        if let Some(hit) = self.cache.get(&key).await {
            counter!("lookup_cache_hits_total", "kind" => kind.path()).increment(1);
            debug!(target: "lookup", key = %key, negative = hit.is_empty(), "cache hit");
            return non_empty_or_not_found(hit, &key);
        }
        counter!("lookup_cache_misses_total", "kind" => kind.path()).increment(1);

        let query = match kind {
            ResourceKind::Launch => ListQuery::by_launch(id),
            ResourceKind::Event => ListQuery::by_event(id),
        };
        let articles = self.store.find_articles(&query).await?;

        if articles.is_empty() {
            counter!("lookup_negative_cached_total", "kind" => kind.path()).increment(1);
            debug!(target: "lookup", key = %key, "no articles; caching negative result");
            let empty = Arc::new(Vec::new());
            self.cache
                .insert(key.clone(), empty.clone(), self.ttls.negative)
                .await;
            return non_empty_or_not_found(empty, &key);
        }

        let enriched = Arc::new(self.enricher.enrich_all(articles).await?);
        debug!(target: "lookup", key = %key, count = enriched.len(), "caching enriched articles");
        self.cache
            .insert(key, enriched.clone(), self.ttls.positive)
            .await;
        Ok(enriched)
    }
}

fn non_empty_or_not_found(
    value: Arc<Vec<EnrichedArticle>>,
    key: &CacheKey,
) -> Result<Arc<Vec<EnrichedArticle>>, ApiError> {
    if value.is_empty() {
        Err(ApiError::NotFound(format!("no articles for {key}")))
    } else {
        Ok(value)
    }
}
