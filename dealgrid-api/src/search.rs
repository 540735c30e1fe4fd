use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::info;

use dealgrid_core::search::{normalize_query, Search, SearchRequest};

use crate::error::AppError;
use crate::middleware::auth::decode_token;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RecentSearchParams {
    #[serde(default = "default_recent_limit")]
    pub limit: i64,
}

fn default_recent_limit() -> i64 {
    10
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/search", post(run_search))
        .route("/search/recent", get(recent_searches))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /search
/// Execute a marketplace search: serve a recent identical search from storage
/// when one is fresh enough, otherwise fan out to every enabled source and
/// ingest whatever came back.
async fn run_search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SearchRequest>,
) -> Result<Json<Search>, AppError> {
    // 1. Normalize the query; grouping and caching key on this value
    let normalized =
        normalize_query(&req.query).map_err(|e| AppError::ValidationError(e.to_string()))?;

    // 2. Attribute the search when a valid bearer token is present.
    //    The endpoint itself stays public; a bad token is just ignored.
    let user_id = bearer_user_id(&state, &headers);

    // 3. Cache check against the latest search for the same normalized query
    if let Some(recent) = state
        .search_repo
        .latest_search_for_query(&normalized)
        .await
        .map_err(AppError::storage)?
    {
        let age = Utc::now() - recent.created_at;
        if age < Duration::minutes(state.search.cache_max_age_minutes) {
            info!(
                "Serving cached search {} for '{}' ({} min old)",
                recent.id,
                normalized,
                age.num_minutes()
            );
            return Ok(Json(recent));
        }
    }

    // 4. Record the search, then fan out to the marketplaces
    let search = state
        .search_repo
        .create_search(req.query.trim(), &normalized, req.filters.as_deref(), user_id)
        .await
        .map_err(AppError::storage)?;

    let offers = state.sources.search_all(&search.query).await;

    // 5. Upsert offers, link them to this search, append price history
    let ingested = state
        .offer_repo
        .ingest_offers(search.id, &offers)
        .await
        .map_err(AppError::storage)?;

    info!(
        "Search {} for '{}' ingested {} offers",
        search.id,
        normalized,
        ingested.len()
    );

    Ok(Json(search))
}

/// GET /search/recent
async fn recent_searches(
    State(state): State<AppState>,
    Query(params): Query<RecentSearchParams>,
) -> Result<Json<Vec<Search>>, AppError> {
    if params.limit < 1 {
        return Err(AppError::ValidationError(
            "limit must be at least 1".to_string(),
        ));
    }

    let searches = state
        .search_repo
        .recent_searches(params.limit)
        .await
        .map_err(AppError::storage)?;

    Ok(Json(searches))
}

fn bearer_user_id(state: &AppState, headers: &HeaderMap) -> Option<i64> {
    let token = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))?;

    decode_token(&state.auth.secret, token)
        .ok()
        .and_then(|claims| claims.sub.parse::<i64>().ok())
}
