use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use dealgrid_deals::DealRecord;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RecentDealsParams {
    #[serde(default = "default_deal_limit")]
    pub limit: usize,
    #[serde(default = "default_deal_hours")]
    pub hours: i64,
}

fn default_deal_limit() -> usize {
    15
}

fn default_deal_hours() -> i64 {
    48
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new().route("/deals/recent", get(recent_deals))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /deals/recent?limit=&hours=
/// Statistically ranked deals across every query group searched inside the
/// window. An empty list means nothing met the bar, not an error.
async fn recent_deals(
    State(state): State<AppState>,
    Query(params): Query<RecentDealsParams>,
) -> Result<Json<Vec<DealRecord>>, AppError> {
    if !(1..=50).contains(&params.limit) {
        return Err(AppError::ValidationError(
            "limit must be between 1 and 50".to_string(),
        ));
    }
    if !(24..=168).contains(&params.hours) {
        return Err(AppError::ValidationError(
            "hours must be between 24 and 168".to_string(),
        ));
    }

    let deals = state
        .deal_engine
        .recent_deals(params.hours, params.limit)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(deals))
}
