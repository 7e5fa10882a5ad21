use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::articles::{parse_list_params, ArticleService};
use crate::cache::LookupCache;
use crate::enrich::EntityEnricher;
use crate::error::ApiError;
use crate::lookup::{CachedLookupService, LookupTtls};
use crate::model::{EnrichedArticle, Report};
use crate::reports::ReportService;
use crate::resolver::ProviderResolver;
use crate::store::{ArticleStore, ProviderStore, ReportStore};

#[derive(Clone)]
pub struct AppState {
    pub articles: ArticleService,
    pub lookup: CachedLookupService,
    pub reports: ReportService,
}

impl AppState {
    /// Wire the read services over one backend that serves articles,
    /// providers and reports. The cache is owned by the caller.
    pub fn from_store<S>(store: Arc<S>, cache: Arc<LookupCache>, ttls: LookupTtls) -> Self
    where
        S: ArticleStore + ProviderStore + ReportStore + 'static,
    {
        let enricher = EntityEnricher::new(ProviderResolver::new(store.clone()));
        Self {
            articles: ArticleService::new(store.clone(), enricher.clone()),
            lookup: CachedLookupService::new(store.clone(), enricher, cache, ttls),
            reports: ReportService::new(store),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/articles", get(list_articles))
        .route("/articles/{id}", get(get_article))
        .route("/articles/launch/{id}", get(articles_by_launch))
        .route("/articles/event/{id}", get(articles_by_event))
        .route("/reports", get(list_reports))
        .route("/reports/{id}", get(get_report))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<EnrichedArticle>>, ApiError> {
    let req = parse_list_params(&params, true)?;
    Ok(Json(state.articles.find(&req).await?))
}

async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EnrichedArticle>, ApiError> {
    Ok(Json(state.articles.find_one(&id).await?))
}

async fn articles_by_launch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Arc<Vec<EnrichedArticle>>>, ApiError> {
    Ok(Json(state.lookup.find_by_launch(&id).await?))
}

async fn articles_by_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Arc<Vec<EnrichedArticle>>>, ApiError> {
    Ok(Json(state.lookup.find_by_event(&id).await?))
}

async fn list_reports(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Report>>, ApiError> {
    let req = parse_list_params(&params, false)?;
    Ok(Json(state.reports.find(&req).await?))
}

async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Report>, ApiError> {
    Ok(Json(state.reports.find_one(&id).await?))
}
