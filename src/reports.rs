// src/reports.rs
use std::sync::Arc;

use crate::articles::{validate_object_id, ListRequest};
use crate::error::ApiError;
use crate::model::Report;
use crate::store::ReportStore;

/// Read access to reports. Reports have no references to resolve, so they are
/// returned as stored.
#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn ReportStore>,
}

impl ReportService {
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self { store }
    }

    pub async fn find_one(&self, id: &str) -> Result<Report, ApiError> {
        let id = validate_object_id(id)?;
        self.store
            .find_report(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("report {id}")))
    }

    pub async fn find(&self, req: &ListRequest) -> Result<Vec<Report>, ApiError> {
        Ok(match &req.search {
            Some(text) => self.store.search_reports(text, &req.query).await?,
            None => self.store.find_reports(&req.query).await?,
        })
    }
}
