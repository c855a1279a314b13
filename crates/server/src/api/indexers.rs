//! Indexer API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use indexer_core::{
    IndexerCapabilities, IndexerError, ReleaseRecord, SearchQuery, SearchType,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct IndexerSummary {
    pub name: String,
    pub implementation: String,
    pub enabled: bool,
    /// Whether the indexer could be built and is ready to search.
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<IndexerCapabilities>,
}

#[derive(Debug, Serialize)]
pub struct IndexersResponse {
    pub indexers: Vec<IndexerSummary>,
}

/// Query string of a search, using the Newznab parameter names.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub imdbid: Option<String>,
    /// Comma separated standard category ids.
    #[serde(default)]
    pub cat: Option<String>,
    #[serde(default)]
    pub t: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    /// Episode number, or `MM/dd` for daily shows.
    #[serde(default)]
    pub ep: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub indexer: String,
    pub count: usize,
    pub releases: Vec<ReleaseRecord>,
}

#[derive(Debug, Serialize)]
pub struct TestResponse {
    pub indexer: String,
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Site problems surface as a bad gateway; an unreadable page means the
/// site layout changed.
fn indexer_error(error: IndexerError) -> ApiError {
    let status = match &error {
        IndexerError::Auth(_) | IndexerError::SessionRejected | IndexerError::Transport(_) => {
            StatusCode::BAD_GATEWAY
        }
        IndexerError::Format(_) => StatusCode::UNPROCESSABLE_ENTITY,
        IndexerError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, error.to_string())
}

fn not_found(name: &str) -> ApiError {
    api_error(
        StatusCode::NOT_FOUND,
        format!("Indexer not found: {}", name),
    )
}

fn parse_search_type(value: Option<&str>) -> Result<SearchType, ApiError> {
    match value.map(str::trim).unwrap_or("search") {
        "" | "search" => Ok(SearchType::Search),
        "movie" => Ok(SearchType::Movie),
        "tvsearch" | "tv" => Ok(SearchType::Tv),
        "music" => Ok(SearchType::Music),
        "book" => Ok(SearchType::Book),
        other => Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("Unknown search type: {}", other),
        )),
    }
}

fn parse_categories(value: Option<&str>) -> Result<Vec<u32>, ApiError> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse().map_err(|_| {
                api_error(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid category id: {}", id),
                )
            })
        })
        .collect()
}

fn parse_season(value: Option<&str>) -> Result<Option<u32>, ApiError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(season) => season.parse().map(Some).map_err(|_| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("Invalid season: {}", season),
            )
        }),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/indexers
///
/// List stored indexers and whether each one is loaded.
pub async fn list_indexers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<IndexersResponse>, ApiError> {
    let definitions = state
        .store()
        .list()
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let indexers = definitions
        .into_iter()
        .map(|definition| {
            let loaded = state.registry().get(&definition.name);
            IndexerSummary {
                loaded: loaded.is_some(),
                capabilities: loaded.map(|indexer| indexer.capabilities().clone()),
                name: definition.name,
                implementation: definition.implementation,
                enabled: definition.enabled,
            }
        })
        .collect();

    Ok(Json(IndexersResponse { indexers }))
}

/// POST /api/v1/indexers/{name}/test
///
/// Log in with the configured credentials.
pub async fn test_indexer(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<TestResponse>, ApiError> {
    let indexer = state.registry().get(&name).ok_or_else(|| not_found(&name))?;

    indexer.test().await.map_err(indexer_error)?;

    Ok(Json(TestResponse {
        indexer: indexer.name().to_string(),
        success: true,
    }))
}

/// GET /api/v1/indexers/{name}/search
///
/// Search one indexer.
pub async fn search_indexer(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let indexer = state.registry().get(&name).ok_or_else(|| not_found(&name))?;

    let search_type = parse_search_type(params.t.as_deref())?;
    if !indexer.capabilities().search_types.contains(&search_type) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("{} does not support {:?} searches", indexer.name(), search_type),
        ));
    }

    let query = SearchQuery {
        search_type,
        term: params.q,
        imdb_id: params.imdbid.filter(|id| !id.trim().is_empty()),
        categories: parse_categories(params.cat.as_deref())?,
        season: parse_season(params.season.as_deref())?,
        episode: params
            .ep
            .map(|ep| ep.trim().to_string())
            .filter(|ep| !ep.is_empty()),
    };
    debug!(indexer = %indexer.name(), ?query, "Searching");

    let releases = indexer.search(&query).await.map_err(indexer_error)?;

    Ok(Json(SearchResponse {
        indexer: indexer.name().to_string(),
        count: releases.len(),
        releases,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexer_core::indexer::TransportError;

    #[test]
    fn test_parse_search_type() {
        assert_eq!(parse_search_type(None).unwrap(), SearchType::Search);
        assert_eq!(parse_search_type(Some("tvsearch")).unwrap(), SearchType::Tv);
        assert_eq!(parse_search_type(Some("movie")).unwrap(), SearchType::Movie);
        let (status, _) = parse_search_type(Some("caps")).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_parse_categories() {
        assert_eq!(
            parse_categories(Some("2000, 5000,,")).unwrap(),
            vec![2000, 5000]
        );
        assert!(parse_categories(None).unwrap().is_empty());
        let (status, _) = parse_categories(Some("2000,movies")).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_parse_season() {
        assert_eq!(parse_season(None).unwrap(), None);
        assert_eq!(parse_season(Some(" ")).unwrap(), None);
        assert_eq!(parse_season(Some("3")).unwrap(), Some(3));
        let (status, Json(body)) = parse_season(Some("x")).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Invalid season: x");
    }

    #[test]
    fn test_indexer_error_status() {
        let cases = [
            (IndexerError::Auth("login failed".into()), StatusCode::BAD_GATEWAY),
            (IndexerError::SessionRejected, StatusCode::BAD_GATEWAY),
            (
                IndexerError::Transport(TransportError::Timeout),
                StatusCode::BAD_GATEWAY,
            ),
            (
                IndexerError::Format("bad date".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                IndexerError::Configuration("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            let (status, _) = indexer_error(error);
            assert_eq!(status, expected);
        }
    }
}
