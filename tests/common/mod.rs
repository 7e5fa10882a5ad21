// tests/common/mod.rs
// Shared fixtures and store doubles for the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

use spaceflight_news_api::model::{Article, EventRef, LaunchRef, Provider, Report};
use spaceflight_news_api::store::{
    ArticleStore, InMemoryStore, ListQuery, ProviderStore, ReportStore,
};
use spaceflight_news_api::StoreError;

pub const LL2: &str = "5f0c5b1e2d3a4b5c6d7e8f90";
pub const SNAPI: &str = "5f0c5b1e2d3a4b5c6d7e8f91";

/// 24-hex object id derived from a small number.
pub fn oid(n: u32) -> String {
    format!("{n:024x}")
}

pub fn article(n: u32, day: u32, launches: &[&str], events: &[&str]) -> Article {
    let ts = Utc.with_ymd_and_hms(2021, 4, day, 10, 0, 0).unwrap();
    Article {
        id: oid(n),
        title: format!("Article {n}"),
        url: format!("https://news.example.com/{n}"),
        image_url: Some(format!("https://img.example.com/{n}.jpg")),
        news_site: "SpaceNews".into(),
        summary: Some(format!("Summary for article {n}")),
        published_at: ts,
        updated_at: ts,
        featured: n % 2 == 0,
        launches: launches
            .iter()
            .map(|l| LaunchRef {
                launch_id: l.to_string(),
                provider: LL2.into(),
            })
            .collect(),
        events: events
            .iter()
            .map(|e| EventRef {
                event_id: e.to_string(),
                provider: LL2.into(),
            })
            .collect(),
    }
}

pub fn report(n: u32, day: u32, site: &str) -> Report {
    let ts = Utc.with_ymd_and_hms(2021, 4, day, 10, 0, 0).unwrap();
    Report {
        id: oid(n),
        title: format!("ISS report {n}"),
        url: format!("https://reports.example.com/{n}"),
        image_url: None,
        news_site: site.into(),
        summary: Some("Crew activities".into()),
        published_at: ts,
        updated_at: ts,
    }
}

pub fn seeded_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    store.insert_provider(Provider {
        id: LL2.into(),
        name: "Launch Library 2".into(),
    });
    store.insert_provider(Provider {
        id: SNAPI.into(),
        name: "Spaceflight News".into(),
    });
    store
}

/// Wraps the memory store and counts article list queries.
pub struct CountingStore {
    pub inner: InMemoryStore,
    pub article_queries: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            article_queries: AtomicUsize::new(0),
        }
    }

    pub fn queries(&self) -> usize {
        self.article_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArticleStore for CountingStore {
    async fn find_article(&self, id: &str) -> Result<Option<Article>, StoreError> {
        self.inner.find_article(id).await
    }

    async fn find_articles(&self, query: &ListQuery) -> Result<Vec<Article>, StoreError> {
        self.article_queries.fetch_add(1, Ordering::SeqCst);
        self.inner.find_articles(query).await
    }

    async fn search_articles(
        &self,
        text: &str,
        query: &ListQuery,
    ) -> Result<Vec<Article>, StoreError> {
        self.article_queries.fetch_add(1, Ordering::SeqCst);
        self.inner.search_articles(text, query).await
    }
}

#[async_trait]
impl ProviderStore for CountingStore {
    async fn find_provider(&self, id: &str) -> Result<Option<Provider>, StoreError> {
        self.inner.find_provider(id).await
    }
}

#[async_trait]
impl ReportStore for CountingStore {
    async fn find_report(&self, id: &str) -> Result<Option<Report>, StoreError> {
        self.inner.find_report(id).await
    }

    async fn find_reports(&self, query: &ListQuery) -> Result<Vec<Report>, StoreError> {
        self.inner.find_reports(query).await
    }

    async fn search_reports(
        &self,
        text: &str,
        query: &ListQuery,
    ) -> Result<Vec<Report>, StoreError> {
        self.inner.search_reports(text, query).await
    }
}

/// Provider store whose lookups take a per-id delay and record completion
/// order. Ids without a configured name are missing.
pub struct SlowProviders {
    pub names: HashMap<String, (String, Duration)>,
    pub completed: Mutex<Vec<String>>,
}

impl SlowProviders {
    pub fn new(entries: &[(&str, &str, u64)]) -> Arc<Self> {
        Arc::new(Self {
            names: entries
                .iter()
                .map(|(id, name, ms)| {
                    (
                        id.to_string(),
                        (name.to_string(), Duration::from_millis(*ms)),
                    )
                })
                .collect(),
            completed: Mutex::new(Vec::new()),
        })
    }

    pub fn completion_order(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderStore for SlowProviders {
    async fn find_provider(&self, id: &str) -> Result<Option<Provider>, StoreError> {
        let Some((name, delay)) = self.names.get(id).cloned() else {
            return Ok(None);
        };
        tokio::time::sleep(delay).await;
        self.completed.lock().unwrap().push(id.to_string());
        Ok(Some(Provider {
            id: id.to_string(),
            name,
        }))
    }
}

/// Captures formatted log lines for the current thread (current-thread
/// tokio tests keep every task on it).
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn install(&self) -> DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }

    /// Lines at `level` (e.g. "ERROR") containing `needle`.
    pub fn count(&self, level: &str, needle: &str) -> usize {
        self.contents()
            .lines()
            .filter(|l| l.contains(level) && l.contains(needle))
            .count()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
