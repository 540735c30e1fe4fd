use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A stored marketplace offer. One row per (source, source_offer_id);
/// repeated sightings update `last_price` and `last_seen_at` rather than
/// inserting a new row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: i64,
    pub source: String,
    pub source_offer_id: String,
    pub title: String,
    pub last_price: Decimal,
    pub currency: String,
    pub url: String,
    pub seller: Option<String>,
    pub image_url: Option<String>,
    pub rating: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

/// Normalized offer record produced by a source adapter during ingest.
/// This is the only shape the storage layer accepts from the outside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOffer {
    pub title: String,
    pub price: Decimal,
    pub currency: String,
    pub url: String,
    pub source: String,
    pub source_offer_id: String,
    pub seller: Option<String>,
    pub image_url: Option<String>,
    pub rating: Option<Decimal>,
}

/// One observed price for an offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub id: i64,
    pub offer_id: i64,
    pub price: Decimal,
    pub currency: String,
    pub fetched_at: DateTime<Utc>,
}

/// Read-only view of one offer inside a deal-scoring time window: the stored
/// offer fields plus the timestamp of the most recent qualifying search that
/// surfaced it. Built by the storage layer, consumed by the scoring engine,
/// never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferSample {
    pub offer_id: i64,
    pub source: String,
    pub source_offer_id: String,
    pub title: String,
    pub last_price: Decimal,
    pub currency: String,
    pub url: String,
    pub seller: Option<String>,
    pub image_url: Option<String>,
    pub rating: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub seen_at: DateTime<Utc>,
}

impl OfferSample {
    /// Price as a float for the statistics pipeline. Stored prices are
    /// NUMERIC(12,2), well inside f64 precision.
    pub fn price_f64(&self) -> f64 {
        self.last_price.to_f64().unwrap_or(0.0)
    }

    pub fn rating_f64(&self) -> Option<f64> {
        self.rating.as_ref().and_then(|r| r.to_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample(price: Decimal, rating: Option<Decimal>) -> OfferSample {
        OfferSample {
            offer_id: 1,
            source: "ebay".into(),
            source_offer_id: "v1|1|0".into(),
            title: "Test".into(),
            last_price: price,
            currency: "USD".into(),
            url: "https://example.com".into(),
            seller: None,
            image_url: None,
            rating,
            created_at: Utc::now(),
            seen_at: Utc::now(),
        }
    }

    #[test]
    fn price_converts_to_f64() {
        let s = sample(dec!(129.99), None);
        assert!((s.price_f64() - 129.99).abs() < 1e-9);
    }

    #[test]
    fn missing_rating_stays_none() {
        let s = sample(dec!(10.00), None);
        assert_eq!(s.rating_f64(), None);
        let s = sample(dec!(10.00), Some(dec!(4.5)));
        assert_eq!(s.rating_f64(), Some(4.5));
    }
}
