// src/error.rs
//! Error taxonomy for the read path and the sync path.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::ResourceKind;

/// Failure reported by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Failure resolving a provider reference to its display name.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("provider reference is empty")]
    EmptyReference,
    #[error("no provider matches reference '{0}'")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("failed to enrich article {article_id}: {source}")]
    EnrichmentFailed {
        article_id: String,
        #[source]
        source: ResolveError,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::EnrichmentFailed { .. } | ApiError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Errors raised while syncing from the upstream feed. These never reach a
/// client; the worker logs them and decides whether the run continues.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("upstream rejected the {kind} sync credential at {url}")]
    UpstreamAuth { kind: ResourceKind, url: String },
    #[error("upstream {kind} page {url} failed: {reason}")]
    UpstreamTransient {
        kind: ResourceKind,
        url: String,
        reason: String,
    },
    #[error("upstream {kind} pagination loops back to {url}")]
    PaginationLoop { kind: ResourceKind, url: String },
    #[error("failed to upsert {kind} record {id}: {reason}")]
    RecordUpsert {
        kind: ResourceKind,
        id: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_taxonomy() {
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        let e = ApiError::EnrichmentFailed {
            article_id: "a".into(),
            source: ResolveError::NotFound("p".into()),
        };
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(e.to_string().contains("no provider matches reference 'p'"));
    }
}
