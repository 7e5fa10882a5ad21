// src/articles.rs
//! Uncached article reads plus the query-string grammar shared with reports.
//!
//! Query params:
//! - `_q`      free-text search (title + summary)
//! - `_limit`  page size (default 10, `-1` for no limit)
//! - `_start`  offset (default 0)
//! - `_sort`   `field:ASC|DESC`, field in publishedAt / updatedAt / title
//! - `newsSite`, `featured` exact-match filters

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::enrich::EntityEnricher;
use crate::error::ApiError;
use crate::model::EnrichedArticle;
use crate::store::{ArticleStore, ListQuery, Sort, SortField, SortOrder};

pub const DEFAULT_LIMIT: usize = 10;

static OBJECT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-fA-F]{24}$").expect("object id regex"));

/// Ids are 24-char hex object ids.
pub fn validate_object_id(id: &str) -> Result<&str, ApiError> {
    if OBJECT_ID.is_match(id) {
        Ok(id)
    } else {
        Err(ApiError::Validation(format!("'{id}' is not a valid id")))
    }
}

/// Parsed list request: optional search text plus the store query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub search: Option<String>,
    pub query: ListQuery,
}

fn parse_sort(raw: &str) -> Result<Sort, ApiError> {
    let (field, order) = raw.split_once(':').unwrap_or((raw, "ASC"));
    let field = match field.trim() {
        "publishedAt" => SortField::PublishedAt,
        "updatedAt" => SortField::UpdatedAt,
        "title" => SortField::Title,
        other => return Err(ApiError::Validation(format!("cannot sort by '{other}'"))),
    };
    let order = match order.trim().to_ascii_uppercase().as_str() {
        "ASC" => SortOrder::Asc,
        "DESC" => SortOrder::Desc,
        other => return Err(ApiError::Validation(format!("unknown sort order '{other}'"))),
    };
    Ok(Sort { field, order })
}

fn parse_usize(params: &HashMap<String, String>, name: &str) -> Result<Option<usize>, ApiError> {
    params
        .get(name)
        .map(|v| {
            v.trim()
                .parse::<usize>()
                .map_err(|_| ApiError::Validation(format!("{name} must be a non-negative integer")))
        })
        .transpose()
}

// `_limit=-1` lifts the page bound.
fn parse_limit(params: &HashMap<String, String>) -> Result<Option<usize>, ApiError> {
    if params.get("_limit").is_some_and(|v| v.trim() == "-1") {
        return Ok(None);
    }
    Ok(Some(parse_usize(params, "_limit")?.unwrap_or(DEFAULT_LIMIT)))
}

/// Parse list params. `featured` is only accepted where the resource has it.
pub fn parse_list_params(
    params: &HashMap<String, String>,
    allow_featured: bool,
) -> Result<ListRequest, ApiError> {
    let mut query = ListQuery {
        limit: parse_limit(params)?,
        offset: parse_usize(params, "_start")?.unwrap_or(0),
        ..ListQuery::default()
    };
    if let Some(raw) = params.get("_sort") {
        query.sort = parse_sort(raw)?;
    }
    if let Some(site) = params.get("newsSite").filter(|s| !s.trim().is_empty()) {
        query.filter.news_site = Some(site.trim().to_string());
    }
    if let Some(raw) = params.get("featured") {
        if !allow_featured {
            return Err(ApiError::Validation("featured is not a filter here".into()));
        }
        let v = raw
            .trim()
            .parse::<bool>()
            .map_err(|_| ApiError::Validation("featured must be true or false".into()))?;
        query.filter.featured = Some(v);
    }
    let search = params
        .get("_q")
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty());

    Ok(ListRequest { search, query })
}

#[derive(Clone)]
pub struct ArticleService {
    store: Arc<dyn ArticleStore>,
    enricher: EntityEnricher,
}

impl ArticleService {
    pub fn new(store: Arc<dyn ArticleStore>, enricher: EntityEnricher) -> Self {
        Self { store, enricher }
    }

    pub async fn find_one(&self, id: &str) -> Result<EnrichedArticle, ApiError> {
        let id = validate_object_id(id)?;
        let article = self
            .store
            .find_article(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("article {id}")))?;
        self.enricher.enrich(article).await
    }

    pub async fn find(&self, req: &ListRequest) -> Result<Vec<EnrichedArticle>, ApiError> {
        let articles = match &req.search {
            Some(text) => self.store.search_articles(text, &req.query).await?,
            None => self.store.find_articles(&req.query).await?,
        };
        self.enricher.enrich_all(articles).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_are_ten_newest_first() {
        let req = parse_list_params(&HashMap::new(), true).unwrap();
        assert_eq!(req.query.limit, Some(DEFAULT_LIMIT));
        assert_eq!(req.query.offset, 0);
        assert_eq!(req.query.sort, Sort::default());
        assert!(req.search.is_none());
    }

    #[test]
    fn parses_sort_window_filters_and_search() {
        let req = parse_list_params(
            &params(&[
                ("_sort", "title:asc"),
                ("_limit", "5"),
                ("_start", "20"),
                ("newsSite", "NASA"),
                ("featured", "true"),
                ("_q", " starlink "),
            ]),
            true,
        )
        .unwrap();
        assert_eq!(
            req.query.sort,
            Sort {
                field: SortField::Title,
                order: SortOrder::Asc
            }
        );
        assert_eq!(req.query.limit, Some(5));
        assert_eq!(req.query.offset, 20);
        assert_eq!(req.query.filter.news_site.as_deref(), Some("NASA"));
        assert_eq!(req.query.filter.featured, Some(true));
        assert_eq!(req.search.as_deref(), Some("starlink"));
    }

    #[test]
    fn malformed_params_are_validation_errors() {
        for bad in [
            params(&[("_sort", "color:DESC")]),
            params(&[("_sort", "title:SIDEWAYS")]),
            params(&[("_limit", "-2")]),
            params(&[("_limit", "ten")]),
            params(&[("featured", "maybe")]),
        ] {
            assert!(matches!(
                parse_list_params(&bad, true),
                Err(ApiError::Validation(_))
            ));
        }
        assert!(parse_list_params(&params(&[("featured", "true")]), false).is_err());
    }

    #[test]
    fn negative_one_limit_means_unbounded() {
        let req = parse_list_params(&params(&[("_limit", "-1")]), true).unwrap();
        assert_eq!(req.query.limit, None);
        let req = parse_list_params(&params(&[("_limit", " -1 ")]), false).unwrap();
        assert_eq!(req.query.limit, None);
    }

    #[test]
    fn object_id_validation() {
        assert!(validate_object_id("5c6d3eb769e4a32ec36c7240").is_ok());
        assert!(validate_object_id("launch").is_err());
        assert!(validate_object_id("5c6d3eb769e4a32ec36c724").is_err());
    }
}
