use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use dealgrid_core::offer::{Offer, PricePoint};
use dealgrid_core::repository::{OfferSort, SortOrder};

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListOffersParams {
    pub search_id: i64,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    20
}

fn default_sort_by() -> String {
    "last_price".to_string()
}

fn default_sort_order() -> String {
    "asc".to_string()
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/offers", get(list_offers))
        .route("/offers/price/{offer_id}", get(price_history))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /offers?search_id=&page=&page_size=&sort_by=&sort_order=
async fn list_offers(
    State(state): State<AppState>,
    Query(params): Query<ListOffersParams>,
) -> Result<Json<Vec<Offer>>, AppError> {
    if params.page < 1 {
        return Err(AppError::ValidationError(
            "page must be at least 1".to_string(),
        ));
    }
    if !(1..=100).contains(&params.page_size) {
        return Err(AppError::ValidationError(
            "page_size must be between 1 and 100".to_string(),
        ));
    }

    let sort = match params.sort_by.as_str() {
        "last_price" => OfferSort::LastPrice,
        "rating" => OfferSort::Rating,
        other => {
            return Err(AppError::ValidationError(format!(
                "sort_by must be last_price or rating, got '{}'",
                other
            )))
        }
    };
    let order = match params.sort_order.as_str() {
        "asc" => SortOrder::Asc,
        "desc" => SortOrder::Desc,
        other => {
            return Err(AppError::ValidationError(format!(
                "sort_order must be asc or desc, got '{}'",
                other
            )))
        }
    };

    let offers = state
        .offer_repo
        .offers_for_search(params.search_id, params.page, params.page_size, sort, order)
        .await
        .map_err(AppError::storage)?;

    Ok(Json(offers))
}

/// GET /offers/price/{offer_id}
async fn price_history(
    State(state): State<AppState>,
    Path(offer_id): Path<i64>,
) -> Result<Json<Vec<PricePoint>>, AppError> {
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

    let history = state
        .offer_repo
        .price_history(offer_id)
        .await
        .map_err(AppError::storage)?;

    Ok(Json(history))
}
