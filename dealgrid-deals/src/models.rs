use chrono::{DateTime, Utc};
use dealgrid_core::offer::OfferSample;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;

/// All offers seen for one normalized query inside the evaluation window.
#[derive(Debug, Clone)]
pub struct QueryGroup {
    pub normalized_query: String,
    pub offers: Vec<OfferSample>,
}

/// An offer that survived outlier filtering, carrying its component scores
/// and the group statistics it was scored against.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub offer: OfferSample,
    pub discount_score: f64,
    pub rating_score: f64,
    pub recency_score: f64,
    pub meta_score: f64,
    pub avg_price: f64,
    pub discount_percentage: f64,
}

impl ScoredCandidate {
    /// Ordering used everywhere candidates are ranked: meta score descending,
    /// then (source, source_offer_id) ascending so equal scores always come
    /// out in the same order.
    pub fn compare_rank(&self, other: &Self) -> Ordering {
        other
            .meta_score
            .partial_cmp(&self.meta_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                (self.offer.source.as_str(), self.offer.source_offer_id.as_str())
                    .cmp(&(other.offer.source.as_str(), other.offer.source_offer_id.as_str()))
            })
    }
}

/// A ranked deal as served to clients. Prices are rounded to 2 decimal
/// places and the meta score to 4, only at this projection step.
#[derive(Debug, Clone, Serialize)]
pub struct DealRecord {
    pub id: i64,
    pub title: String,
    pub last_price: Decimal,
    pub currency: String,
    pub url: String,
    pub source: String,
    pub source_offer_id: String,
    pub seller: Option<String>,
    pub image_url: Option<String>,
    pub rating: Option<f64>,
    pub meta_score: f64,
    pub avg_price: Decimal,
    pub discount_percentage: f64,
    pub created_at: DateTime<Utc>,
    pub search_date: DateTime<Utc>,
}

impl DealRecord {
    pub fn from_candidate(candidate: &ScoredCandidate) -> Self {
        let offer = &candidate.offer;
        Self {
            id: offer.offer_id,
            title: offer.title.clone(),
            last_price: offer.last_price.round_dp(2),
            currency: offer.currency.clone(),
            url: offer.url.clone(),
            source: offer.source.clone(),
            source_offer_id: offer.source_offer_id.clone(),
            seller: offer.seller.clone(),
            image_url: offer.image_url.clone(),
            rating: offer.rating_f64(),
            meta_score: round_to(candidate.meta_score, 4),
            avg_price: Decimal::from_f64(candidate.avg_price)
                .unwrap_or_default()
                .round_dp(2),
            discount_percentage: round_to(candidate.discount_percentage, 2),
            created_at: offer.created_at,
            search_date: offer.seen_at,
        }
    }
}

fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10_f64.powi(places as i32);
    (value * factor).round() / factor
}
