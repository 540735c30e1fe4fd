use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use dealgrid_core::offer::{NewOffer, Offer, PricePoint};
use dealgrid_core::repository::{OfferRepository, OfferSort, SortOrder};

pub struct PostgresOfferRepository {
    pub pool: PgPool,
}

#[derive(sqlx::FromRow)]
pub(crate) struct OfferRow {
    pub(crate) id: i64,
    pub(crate) source: String,
    pub(crate) source_offer_id: String,
    pub(crate) title: String,
    pub(crate) last_price: Decimal,
    pub(crate) currency: String,
    pub(crate) url: String,
    pub(crate) seller: Option<String>,
    pub(crate) image_url: Option<String>,
    pub(crate) rating: Option<Decimal>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) last_seen_at: Option<DateTime<Utc>>,
}

impl From<OfferRow> for Offer {
    fn from(row: OfferRow) -> Self {
        Offer {
            id: row.id,
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
            last_seen_at: row.last_seen_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PricePointRow {
    id: i64,
    offer_id: i64,
    price: Decimal,
    currency: String,
    fetched_at: DateTime<Utc>,
}

pub(crate) const OFFER_COLUMNS: &str = "id, source, source_offer_id, title, last_price, currency, \
     url, seller, image_url, rating, created_at, last_seen_at";

#[async_trait]
impl OfferRepository for PostgresOfferRepository {
    async fn ingest_offers(
        &self,
        search_id: i64,
        offers: &[NewOffer],
    ) -> Result<Vec<Offer>, Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(offers.len());

        let upsert = format!(
            r#"
            INSERT INTO offers (source, source_offer_id, title, last_price, currency,
                                url, seller, image_url, rating)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (source, source_offer_id) DO UPDATE
                SET last_price = EXCLUDED.last_price,
                    rating = EXCLUDED.rating,
                    last_seen_at = now()
            RETURNING {OFFER_COLUMNS}
            "#
        );

        for offer in offers {
            // 1. Upsert the offer; a repeat sighting refreshes price and
            //    rating but keeps the original listing text
            let row = sqlx::query_as::<_, OfferRow>(&upsert)
                .bind(&offer.source)
                .bind(&offer.source_offer_id)
                .bind(&offer.title)
                .bind(offer.price)
                .bind(&offer.currency)
                .bind(&offer.url)
                .bind(&offer.seller)
                .bind(&offer.image_url)
                .bind(offer.rating)
                .fetch_one(&mut *tx)
                .await?;

            // 2. Tie the offer to the search that surfaced it
            sqlx::query(
                r#"
                INSERT INTO search_offer_link (search_id, offer_id)
                VALUES ($1, $2)
                ON CONFLICT (search_id, offer_id) DO NOTHING
                "#,
            )
            .bind(search_id)
            .bind(row.id)
            .execute(&mut *tx)
            .await?;

            // 3. Append the sighting to the price history
            sqlx::query(
                r#"
                INSERT INTO price_history (offer_id, price, currency)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(row.id)
            .bind(row.last_price)
            .bind(&row.currency)
            .execute(&mut *tx)
            .await?;

            stored.push(row.into());
        }

        tx.commit().await?;
        tracing::info!("Ingested {} offers for search {}", stored.len(), search_id);
        Ok(stored)
    }

    async fn offers_for_search(
        &self,
        search_id: i64,
        page: i64,
        page_size: i64,
        sort: OfferSort,
        order: SortOrder,
    ) -> Result<Vec<Offer>, Box<dyn std::error::Error + Send + Sync>> {
        // Sort column and direction come from closed enums, never from the
        // request string, so interpolation here is safe.
        let sort_column = match sort {
            OfferSort::LastPrice => "o.last_price",
            OfferSort::Rating => "o.rating",
        };
        let direction = match order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let offset = (page - 1) * page_size;

        let sql = format!(
            r#"
            SELECT o.id, o.source, o.source_offer_id, o.title, o.last_price, o.currency,
                   o.url, o.seller, o.image_url, o.rating, o.created_at, o.last_seen_at
            FROM offers o
            JOIN search_offer_link l ON l.offer_id = o.id
            WHERE l.search_id = $1
            ORDER BY {sort_column} {direction} NULLS LAST, o.id ASC
            LIMIT $2 OFFSET $3
            "#
        );

        let rows = sqlx::query_as::<_, OfferRow>(&sql)
            .bind(search_id)
            .bind(page_size)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Offer::from).collect())
    }

    async fn get_offer(
        &self,
        offer_id: i64,
    ) -> Result<Option<Offer>, Box<dyn std::error::Error + Send + Sync>> {
        let sql = format!("SELECT {OFFER_COLUMNS} FROM offers WHERE id = $1");
        let row = sqlx::query_as::<_, OfferRow>(&sql)
            .bind(offer_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Offer::from))
    }

    async fn price_history(
        &self,
        offer_id: i64,
    ) -> Result<Vec<PricePoint>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, PricePointRow>(
            r#"
            SELECT id, offer_id, price, currency, fetched_at
            FROM price_history
            WHERE offer_id = $1
            ORDER BY fetched_at ASC
            "#,
        )
        .bind(offer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| PricePoint {
                id: row.id,
                offer_id: row.offer_id,
                price: row.price,
                currency: row.currency,
                fetched_at: row.fetched_at,
            })
            .collect())
    }

    async fn apply_price_refresh(
        &self,
        offer_id: i64,
        price: Decimal,
        currency: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        // Only a changed price moves last_price/last_seen_at; the history
        // row is appended either way to record that the check happened.
        sqlx::query(
            r#"
            UPDATE offers
            SET last_price = $2, last_seen_at = now()
            WHERE id = $1 AND last_price IS DISTINCT FROM $2
            "#,
        )
        .bind(offer_id)
        .bind(price)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO price_history (offer_id, price, currency)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(offer_id)
        .bind(price)
        .bind(currency)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
