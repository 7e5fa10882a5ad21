//! # Enrichment
//! Turns a stored [`Article`] into the client-facing [`EnrichedArticle`] by
//! resolving every launch/event provider reference to a display name.
//!
//! All references of one article are resolved concurrently and joined in
//! input order; one failed reference fails the whole article. No caching
//! happens here (see `lookup`).

use futures::future::{try_join, try_join_all};

use crate::error::{ApiError, ResolveError};
use crate::model::{Article, EnrichedArticle, EnrichedRef};
use crate::resolver::ProviderResolver;

#[derive(Clone)]
pub struct EntityEnricher {
    resolver: ProviderResolver,
}

impl EntityEnricher {
    pub fn new(resolver: ProviderResolver) -> Self {
        Self { resolver }
    }

    pub async fn enrich(&self, article: Article) -> Result<EnrichedArticle, ApiError> {
        let launches = try_join_all(article.launches.iter().map(|l| async move {
            let provider = self.resolver.resolve(&l.provider).await?;
            Ok::<_, ResolveError>(EnrichedRef {
                id: l.launch_id.clone(),
                provider,
            })
        }));
        let events = try_join_all(article.events.iter().map(|e| async move {
            let provider = self.resolver.resolve(&e.provider).await?;
            Ok::<_, ResolveError>(EnrichedRef {
                id: e.event_id.clone(),
                provider,
            })
        }));

        let (launches, events) = try_join(launches, events).await.map_err(|source| {
            ApiError::EnrichmentFailed {
                article_id: article.id.clone(),
                source,
            }
        })?;

        Ok(EnrichedArticle {
            id: article.id,
            title: article.title,
            url: article.url,
            image_url: article.image_url,
            news_site: article.news_site,
            summary: article.summary,
            published_at: article.published_at,
            updated_at: article.updated_at,
            featured: article.featured,
            launches,
            events,
        })
    }

    /// Enrich a batch concurrently, keeping input order. Fails as a whole if
    /// any article fails.
    pub async fn enrich_all(
        &self,
        articles: Vec<Article>,
    ) -> Result<Vec<EnrichedArticle>, ApiError> {
        try_join_all(articles.into_iter().map(|a| self.enrich(a))).await
    }
}
