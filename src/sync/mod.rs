// src/sync/mod.rs
//! Launch/event sync from the upstream feed.
//!
//! A run walks the feed page by page from the first page until the upstream
//! stops returning a `next` link. Failures are contained:
//! - a bad record is logged and skipped, the page continues;
//! - a failed page ends the run (the next scheduled run starts over);
//! - a 401 ends the run with its own log line;
//! - a `next` link to a page already fetched in this run ends it as failed.
//!
//! Upserts are keyed by upstream id, so re-processing already synced pages
//! converges to the same local state.

pub mod scheduler;
pub mod upstream;

use std::collections::HashSet;
use std::sync::Arc;

use metrics::{counter, gauge};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::error::SyncError;
use crate::model::{EventRecord, LaunchRecord, ResourceKind, UpstreamEvent, UpstreamLaunch};
use crate::store::{SyncStore, Upsert};

pub use scheduler::{
    start_scheduler, ScheduleCfg, SchedulerHandle, DEFAULT_EVENTS_CRON, DEFAULT_LAUNCHES_CRON,
};
pub use upstream::{FeedSource, PageError, UpstreamClient};

pub const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Reached a page without a `next` link.
    Completed,
    /// Upstream rejected the credential.
    AuthRejected,
    /// A page fetch failed; the run ended early.
    PageFailed,
    /// Another run for the same kind was already in flight.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub kind: ResourceKind,
    pub pages: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub outcome: SyncOutcome,
}

impl SyncReport {
    fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            pages: 0,
            inserted: 0,
            updated: 0,
            unchanged: 0,
            failed: 0,
            outcome: SyncOutcome::Completed,
        }
    }

    pub fn upserted(&self) -> usize {
        self.inserted + self.updated + self.unchanged
    }
}

pub struct SyncWorker {
    source: Arc<dyn FeedSource>,
    store: Arc<dyn SyncStore>,
    page_size: u32,
    // One guard per kind: runs of the same kind never overlap.
    launch_guard: Mutex<()>,
    event_guard: Mutex<()>,
}

impl SyncWorker {
    pub fn new(source: Arc<dyn FeedSource>, store: Arc<dyn SyncStore>, page_size: u32) -> Self {
        Self {
            source,
            store,
            page_size: page_size.max(1),
            launch_guard: Mutex::new(()),
            event_guard: Mutex::new(()),
        }
    }

    /// Run a full sync for `kind`. Never fails; the report says how far it got.
    pub async fn sync_all(&self, kind: ResourceKind) -> SyncReport {
        let guard = match kind {
            ResourceKind::Launch => &self.launch_guard,
            ResourceKind::Event => &self.event_guard,
        };
        let Ok(_running) = guard.try_lock() else {
            warn!(target: "sync", %kind, "sync already running; skipping");
            return SyncReport {
                outcome: SyncOutcome::Skipped,
                ..SyncReport::new(kind)
            };
        };

        counter!("sync_runs_total", "kind" => kind.path()).increment(1);
        let mut report = SyncReport::new(kind);
        let mut next = Some(self.source.first_page_url(kind, self.page_size));
        let mut visited = HashSet::new();
        info!(target: "sync", %kind, url = next.as_deref().unwrap_or_default(), "starting sync");

        while let Some(url) = next.take() {
            if !visited.insert(url.clone()) {
                let err = SyncError::PaginationLoop { kind, url };
                counter!("sync_page_errors_total", "kind" => kind.path()).increment(1);
                error!(target: "sync", %kind, error = %err, "pagination revisits a page; ending run");
                report.outcome = SyncOutcome::PageFailed;
                break;
            }
            let page = match self.source.fetch_page(&url).await {
                Ok(page) => page,
                Err(PageError::Unauthorized) => {
                    let err = SyncError::UpstreamAuth { kind, url };
                    counter!("sync_auth_errors_total", "kind" => kind.path()).increment(1);
                    error!(target: "sync", %kind, error = %err, "upstream token not valid; aborting run");
                    report.outcome = SyncOutcome::AuthRejected;
                    break;
                }
                Err(PageError::Transient(reason)) => {
                    let err = SyncError::UpstreamTransient { kind, url, reason };
                    counter!("sync_page_errors_total", "kind" => kind.path()).increment(1);
                    error!(target: "sync", %kind, error = %err, "page fetch failed; ending run");
                    report.outcome = SyncOutcome::PageFailed;
                    break;
                }
            };
            report.pages += 1;

            for raw in page.results {
                match self.upsert(kind, raw).await {
                    Ok(Upsert::Inserted) => report.inserted += 1,
                    Ok(Upsert::Updated) => report.updated += 1,
                    Ok(Upsert::Unchanged) => report.unchanged += 1,
                    Err(err) => {
                        report.failed += 1;
                        counter!("sync_record_errors_total", "kind" => kind.path()).increment(1);
                        error!(target: "sync", %kind, error = %err, "skipping record");
                    }
                }
            }
            next = page.next.filter(|n| !n.trim().is_empty());
        }

        counter!("sync_records_upserted_total", "kind" => kind.path())
            .increment(report.upserted() as u64);
        gauge!("sync_last_run_ts", "kind" => kind.path())
            .set(chrono::Utc::now().timestamp() as f64);
        info!(
            target: "sync",
            %kind,
            pages = report.pages,
            inserted = report.inserted,
            updated = report.updated,
            unchanged = report.unchanged,
            failed = report.failed,
            outcome = ?report.outcome,
            "sync finished"
        );
        report
    }

    async fn upsert(&self, kind: ResourceKind, raw: Value) -> Result<Upsert, SyncError> {
        let id = raw
            .get("id")
            .map(|v| v.to_string().trim_matches('"').to_string())
            .unwrap_or_else(|| "<missing>".to_string());
        let fail = |reason: String| SyncError::RecordUpsert {
            kind,
            id: id.clone(),
            reason,
        };

        match kind {
            ResourceKind::Launch => {
                let launch: UpstreamLaunch =
                    serde_json::from_value(raw).map_err(|e| fail(e.to_string()))?;
                self.store
                    .upsert_launch(LaunchRecord::from(launch))
                    .await
                    .map_err(|e| fail(e.to_string()))
            }
            ResourceKind::Event => {
                let event: UpstreamEvent =
                    serde_json::from_value(raw).map_err(|e| fail(e.to_string()))?;
                self.store
                    .upsert_event(EventRecord::from(event))
                    .await
                    .map_err(|e| fail(e.to_string()))
            }
        }
    }
}
