use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use dealgrid_core::offer::OfferSample;
use dealgrid_core::repository::DealFeedRepository;

/// Read-only view over searches and offers that feeds the scoring engine.
/// Both queries are bounded by the same cutoff so one engine run sees a
/// consistent window.
pub struct PostgresDealFeedRepository {
    pub pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct OfferSampleRow {
    offer_id: i64,
    source: String,
    source_offer_id: String,
    title: String,
    last_price: Decimal,
    currency: String,
    url: String,
    seller: Option<String>,
    image_url: Option<String>,
    rating: Option<Decimal>,
    created_at: DateTime<Utc>,
    seen_at: DateTime<Utc>,
}

impl From<OfferSampleRow> for OfferSample {
    fn from(row: OfferSampleRow) -> Self {
        OfferSample {
            offer_id: row.offer_id,
            source: row.source,
            source_offer_id: row.source_offer_id,
            title: row.title,
            last_price: row.last_price,
            currency: row.currency,
            url: row.url,
            seller: row.seller,
            image_url: row.image_url,
            rating: row.rating,
            created_at: row.created_at,
            seen_at: row.seen_at,
        }
    }
}

#[async_trait]
impl DealFeedRepository for PostgresDealFeedRepository {
    async fn distinct_recent_queries(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT normalized_query
            FROM searches
            WHERE created_at >= $1
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(q,)| q).collect())
    }

    async fn offers_for_query(
        &self,
        normalized_query: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<OfferSample>, Box<dyn std::error::Error + Send + Sync>> {
        // One row per offer even when several searches in the window
        // surfaced it; seen_at is the latest such sighting.
        let rows = sqlx::query_as::<_, OfferSampleRow>(
            r#"
            SELECT o.id AS offer_id, o.source, o.source_offer_id, o.title,
                   o.last_price, o.currency, o.url, o.seller, o.image_url,
                   o.rating, o.created_at, MAX(s.created_at) AS seen_at
            FROM offers o
            JOIN search_offer_link l ON l.offer_id = o.id
            JOIN searches s ON s.id = l.search_id
            WHERE s.normalized_query = $1 AND s.created_at >= $2
            GROUP BY o.id
            "#,
        )
        .bind(normalized_query)
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OfferSample::from).collect())
    }
}
