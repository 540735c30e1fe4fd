use axum::{
    extract::{Path, Query, State},
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use dealgrid_core::search::Search;
use dealgrid_core::user::{NewWatchlistItem, WatchlistItem};

use crate::error::AppError;
use crate::middleware::auth::{user_auth_middleware, UserClaims};
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

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/users/watchlist",
            get(list_watchlist).post(add_watchlist_item),
        )
        .route("/users/watchlist/{item_id}", delete(remove_watchlist_item))
        .route("/users/recent-searches", get(recent_searches))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            user_auth_middleware,
        ))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /users/watchlist
async fn list_watchlist(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
) -> Result<Json<Vec<WatchlistItem>>, AppError> {
    let user_id = claims.user_id()?;
    let items = state
        .user_repo
        .watchlist_for_user(user_id)
        .await
        .map_err(AppError::storage)?;

    Ok(Json(items))
}

/// POST /users/watchlist
async fn add_watchlist_item(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Json(item): Json<NewWatchlistItem>,
) -> Result<Json<WatchlistItem>, AppError> {
    let user_id = claims.user_id()?;

    if item.product_title.trim().is_empty() {
        return Err(AppError::ValidationError(
            "product_title is required".to_string(),
        ));
    }

    // A dangling offer reference is a caller mistake, not a soft failure
    if let Some(offer_id) = item.offer_id {
        let offer = state
            .offer_repo
            .get_offer(offer_id)
            .await
            .map_err(AppError::storage)?;
        if offer.is_none() {
            return Err(AppError::NotFoundError(format!(
                "Offer {} not found",
                offer_id
            )));
        }
    }

    let created = state
        .user_repo
        .add_watchlist_item(user_id, &item)
        .await
        .map_err(AppError::storage)?;

    Ok(Json(created))
}

/// DELETE /users/watchlist/{item_id}
async fn remove_watchlist_item(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(item_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let user_id = claims.user_id()?;
    let removed = state
        .user_repo
        .remove_watchlist_item(user_id, item_id)
        .await
        .map_err(AppError::storage)?;

    if !removed {
        return Err(AppError::NotFoundError(
            "Watchlist item not found".to_string(),
        ));
    }

    Ok(Json(json!({"message": "Item removed from watchlist"})))
}

/// GET /users/recent-searches
async fn recent_searches(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Query(params): Query<RecentSearchParams>,
) -> Result<Json<Vec<Search>>, AppError> {
    if params.limit < 1 {
        return Err(AppError::ValidationError(
            "limit must be at least 1".to_string(),
        ));
    }

    let user_id = claims.user_id()?;
    let searches = state
        .search_repo
        .recent_searches_for_user(user_id, params.limit)
        .await
        .map_err(AppError::storage)?;

    Ok(Json(searches))
}
