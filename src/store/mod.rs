// src/store/mod.rs
//! Storage seams. The service only talks to these traits; `memory` provides
//! the in-process backend used by the binary and the tests.

pub mod memory;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{Article, EventRecord, LaunchRecord, Provider, Report};

pub use memory::{InMemoryStore, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    PublishedAt,
    UpdatedAt,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: SortField::PublishedAt,
            order: SortOrder::Desc,
        }
    }
}

/// Exact-match filters. Reference filters (`launch_id`, `event_id`) match
/// against the nested `launches.launchId` / `events.eventId` fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub news_site: Option<String>,
    pub featured: Option<bool>,
    pub launch_id: Option<String>,
    pub event_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: Filter,
    pub sort: Sort,
    /// `None` returns every match.
    pub limit: Option<usize>,
    pub offset: usize,
}

impl ListQuery {
    pub fn by_launch(launch_id: &str) -> Self {
        Self {
            filter: Filter {
                launch_id: Some(launch_id.to_string()),
                ..Filter::default()
            },
            ..Self::default()
        }
    }

    pub fn by_event(event_id: &str) -> Self {
        Self {
            filter: Filter {
                event_id: Some(event_id.to_string()),
                ..Filter::default()
            },
            ..Self::default()
        }
    }
}

#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn find_article(&self, id: &str) -> Result<Option<Article>, StoreError>;
    async fn find_articles(&self, query: &ListQuery) -> Result<Vec<Article>, StoreError>;
    /// Free-text search; `query` still applies its filter, sort and window.
    async fn search_articles(
        &self,
        text: &str,
        query: &ListQuery,
    ) -> Result<Vec<Article>, StoreError>;
}

#[async_trait]
pub trait ProviderStore: Send + Sync {
    async fn find_provider(&self, id: &str) -> Result<Option<Provider>, StoreError>;
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn find_report(&self, id: &str) -> Result<Option<Report>, StoreError>;
    async fn find_reports(&self, query: &ListQuery) -> Result<Vec<Report>, StoreError>;
    async fn search_reports(&self, text: &str, query: &ListQuery)
        -> Result<Vec<Report>, StoreError>;
}

/// What an upsert did to the stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
    Unchanged,
}

/// Write side used by the sync worker. Upserts are keyed by upstream id.
#[async_trait]
pub trait SyncStore: Send + Sync {
    async fn upsert_launch(&self, record: LaunchRecord) -> Result<Upsert, StoreError>;
    async fn upsert_event(&self, record: EventRecord) -> Result<Upsert, StoreError>;
}
