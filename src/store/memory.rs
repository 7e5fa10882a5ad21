// src/store/memory.rs
//! In-process store backend, optionally seeded from a JSON snapshot file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    ArticleStore, Filter, ListQuery, ProviderStore, ReportStore, SortField, SortOrder, SyncStore,
    Upsert,
};
use crate::error::StoreError;
use crate::model::{Article, EventRecord, LaunchRecord, Provider, Report};

/// On-disk seed format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub providers: Vec<Provider>,
    #[serde(default)]
    pub reports: Vec<Report>,
    #[serde(default)]
    pub launches: Vec<LaunchRecord>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
}

#[derive(Debug, Default)]
struct Data {
    articles: Vec<Article>,
    providers: HashMap<String, Provider>,
    reports: Vec<Report>,
    launches: HashMap<String, LaunchRecord>,
    events: HashMap<String, EventRecord>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Data>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snap: Snapshot) -> Self {
        let data = Data {
            articles: snap.articles,
            providers: snap
                .providers
                .into_iter()
                .map(|p| (p.id.clone(), p))
                .collect(),
            reports: snap.reports,
            launches: snap
                .launches
                .into_iter()
                .map(|l| (l.id.clone(), l))
                .collect(),
            events: snap.events.into_iter().map(|e| (e.id.clone(), e)).collect(),
        };
        Self {
            inner: RwLock::new(data),
        }
    }

    /// Load a JSON [`Snapshot`] from disk.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading store seed {}", path.display()))?;
        let snap: Snapshot = serde_json::from_str(&raw)
            .with_context(|| format!("parsing store seed {}", path.display()))?;
        Ok(Self::from_snapshot(snap))
    }

    pub fn insert_article(&self, article: Article) {
        let mut d = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        d.articles.retain(|a| a.id != article.id);
        d.articles.push(article);
    }

    pub fn insert_provider(&self, provider: Provider) {
        let mut d = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        d.providers.insert(provider.id.clone(), provider);
    }

    pub fn insert_report(&self, report: Report) {
        let mut d = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        d.reports.retain(|r| r.id != report.id);
        d.reports.push(report);
    }

    pub fn launch(&self, id: &str) -> Option<LaunchRecord> {
        let d = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        d.launches.get(id).cloned()
    }

    pub fn event(&self, id: &str) -> Option<EventRecord> {
        let d = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        d.events.get(id).cloned()
    }

    pub fn launch_count(&self) -> usize {
        let d = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        d.launches.len()
    }

    pub fn event_count(&self) -> usize {
        let d = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        d.events.len()
    }
}

// Fields shared by articles and reports for filtering/sorting.
trait Listed: Clone {
    fn title(&self) -> &str;
    fn summary(&self) -> Option<&str>;
    fn news_site(&self) -> &str;
    fn published_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
    fn matches_refs(&self, filter: &Filter) -> bool;
}

impl Listed for Article {
    fn title(&self) -> &str {
        &self.title
    }
    fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }
    fn news_site(&self) -> &str {
        &self.news_site
    }
    fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
    fn matches_refs(&self, f: &Filter) -> bool {
        if let Some(featured) = f.featured {
            if self.featured != featured {
                return false;
            }
        }
        if let Some(id) = &f.launch_id {
            if !self.launches.iter().any(|l| &l.launch_id == id) {
                return false;
            }
        }
        if let Some(id) = &f.event_id {
            if !self.events.iter().any(|e| &e.event_id == id) {
                return false;
            }
        }
        true
    }
}

impl Listed for Report {
    fn title(&self) -> &str {
        &self.title
    }
    fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }
    fn news_site(&self) -> &str {
        &self.news_site
    }
    fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
    // Reports have no references; reference filters never match.
    fn matches_refs(&self, f: &Filter) -> bool {
        f.launch_id.is_none() && f.event_id.is_none()
    }
}

fn matches_text<T: Listed>(item: &T, needle: &str) -> bool {
    item.title().to_lowercase().contains(needle)
        || item
            .summary()
            .is_some_and(|s| s.to_lowercase().contains(needle))
}

fn select<T: Listed>(items: &[T], text: Option<&str>, q: &ListQuery) -> Vec<T> {
    let needle = text.map(|t| t.trim().to_lowercase());
    let mut out: Vec<T> = items
        .iter()
        .filter(|it| {
            q.filter
                .news_site
                .as_deref()
                .map_or(true, |site| it.news_site().eq_ignore_ascii_case(site))
        })
        .filter(|it| it.matches_refs(&q.filter))
        .filter(|it| needle.as_deref().map_or(true, |n| matches_text(*it, n)))
        .cloned()
        .collect();

    out.sort_by(|a, b| {
        let ord = match q.sort.field {
            SortField::PublishedAt => a.published_at().cmp(&b.published_at()),
            SortField::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
            SortField::Title => a.title().cmp(b.title()),
        };
        match q.sort.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });

    let window = out.into_iter().skip(q.offset);
    match q.limit {
        Some(n) => window.take(n).collect(),
        None => window.collect(),
    }
}

#[async_trait]
impl ArticleStore for InMemoryStore {
    async fn find_article(&self, id: &str) -> Result<Option<Article>, StoreError> {
        let d = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(d.articles.iter().find(|a| a.id == id).cloned())
    }

    async fn find_articles(&self, query: &ListQuery) -> Result<Vec<Article>, StoreError> {
        let d = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(select(&d.articles, None, query))
    }

    async fn search_articles(
        &self,
        text: &str,
        query: &ListQuery,
    ) -> Result<Vec<Article>, StoreError> {
        let d = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(select(&d.articles, Some(text), query))
    }
}

#[async_trait]
impl ProviderStore for InMemoryStore {
    async fn find_provider(&self, id: &str) -> Result<Option<Provider>, StoreError> {
        let d = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(d.providers.get(id).cloned())
    }
}

#[async_trait]
impl ReportStore for InMemoryStore {
    async fn find_report(&self, id: &str) -> Result<Option<Report>, StoreError> {
        let d = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(d.reports.iter().find(|r| r.id == id).cloned())
    }

    async fn find_reports(&self, query: &ListQuery) -> Result<Vec<Report>, StoreError> {
        let d = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(select(&d.reports, None, query))
    }

    async fn search_reports(
        &self,
        text: &str,
        query: &ListQuery,
    ) -> Result<Vec<Report>, StoreError> {
        let d = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(select(&d.reports, Some(text), query))
    }
}

fn upsert_into<T: PartialEq>(map: &mut HashMap<String, T>, id: String, record: T) -> Upsert {
    match map.get_mut(&id) {
        Some(existing) if *existing == record => Upsert::Unchanged,
        Some(existing) => {
            *existing = record;
            Upsert::Updated
        }
        None => {
            map.insert(id, record);
            Upsert::Inserted
        }
    }
}

#[async_trait]
impl SyncStore for InMemoryStore {
    async fn upsert_launch(&self, record: LaunchRecord) -> Result<Upsert, StoreError> {
        let mut d = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        Ok(upsert_into(&mut d.launches, record.id.clone(), record))
    }

    async fn upsert_event(&self, record: EventRecord) -> Result<Upsert, StoreError> {
        let mut d = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        Ok(upsert_into(&mut d.events, record.id.clone(), record))
    }
}
