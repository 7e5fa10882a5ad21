// src/sync/scheduler.rs
//! Cron-driven sync triggers, one job per kind (UTC).

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use super::SyncWorker;
use crate::model::ResourceKind;

pub const DEFAULT_LAUNCHES_CRON: &str = "0 6 * * *";
pub const DEFAULT_EVENTS_CRON: &str = "15 6 * * *";

/// Cron expressions per kind. Five fields, or six with leading seconds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleCfg {
    pub launches_cron: String,
    pub events_cron: String,
}

impl Default for ScheduleCfg {
    fn default() -> Self {
        Self {
            launches_cron: DEFAULT_LAUNCHES_CRON.to_string(),
            events_cron: DEFAULT_EVENTS_CRON.to_string(),
        }
    }
}

pub struct SchedulerHandle {
    sched: JobScheduler,
}

impl SchedulerHandle {
    pub async fn stop(mut self) {
        if let Err(e) = self.sched.shutdown().await {
            error!(target: "sync", error = %e, "scheduler shutdown failed");
        } else {
            info!(target: "sync", "scheduler stopped");
        }
    }
}

/// Register one job per kind and start the scheduler. A job that fires while
/// the previous run of its kind is still going is skipped by the worker's
/// per-kind guard.
pub async fn start_scheduler(worker: Arc<SyncWorker>, cfg: &ScheduleCfg) -> Result<SchedulerHandle> {
    let sched = JobScheduler::new().await.context("creating sync scheduler")?;

    for (kind, cron) in [
        (ResourceKind::Launch, cfg.launches_cron.as_str()),
        (ResourceKind::Event, cfg.events_cron.as_str()),
    ] {
        let worker = worker.clone();
        let job = Job::new_async(cron, move |_id, _sched| {
            let worker = worker.clone();
            Box::pin(async move {
                worker.sync_all(kind).await;
            })
        })
        .with_context(|| format!("invalid {kind} sync cron '{cron}'"))?;
        sched
            .add(job)
            .await
            .with_context(|| format!("adding {kind} sync job"))?;
        info!(target: "sync", %kind, cron, "sync job scheduled");
    }

    sched.start().await.context("starting sync scheduler")?;
    Ok(SchedulerHandle { sched })
}
