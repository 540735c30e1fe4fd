use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use dealgrid_core::offer::Offer;
use dealgrid_core::repository::UserRepository;
use dealgrid_core::user::{NewWatchlistItem, User, WatchlistItem};

use crate::offer_repo::{OfferRow, OFFER_COLUMNS};

pub struct PostgresUserRepository {
    pub pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    hashed_password: String,
    full_name: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            hashed_password: row.hashed_password,
            full_name: row.full_name,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct WatchlistItemRow {
    id: i64,
    user_id: i64,
    offer_id: Option<i64>,
    product_title: String,
    product_url: Option<String>,
    current_price: Option<Decimal>,
    source: Option<String>,
    product_image_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<WatchlistItemRow> for WatchlistItem {
    fn from(row: WatchlistItemRow) -> Self {
        WatchlistItem {
            id: row.id,
            user_id: row.user_id,
            offer_id: row.offer_id,
            product_title: row.product_title,
            product_url: row.product_url,
            current_price: row.current_price,
            source: row.source,
            product_image_url: row.product_image_url,
            created_at: row.created_at,
        }
    }
}

const USER_COLUMNS: &str = "id, username, email, hashed_password, full_name, is_active, created_at";

const WATCHLIST_COLUMNS: &str = "id, user_id, offer_id, product_title, product_url, \
     current_price, source, product_image_url, created_at";

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        hashed_password: &str,
        full_name: Option<&str>,
    ) -> Result<User, Box<dyn std::error::Error + Send + Sync>> {
        let sql = format!(
            r#"
            INSERT INTO users (username, email, hashed_password, full_name)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .bind(email)
            .bind(hashed_password)
            .bind(full_name)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn find_by_id(
        &self,
        user_id: i64,
    ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    async fn add_watchlist_item(
        &self,
        user_id: i64,
        item: &NewWatchlistItem,
    ) -> Result<WatchlistItem, Box<dyn std::error::Error + Send + Sync>> {
        let sql = format!(
            r#"
            INSERT INTO user_watchlist (user_id, offer_id, product_title, product_url,
                                        current_price, source, product_image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {WATCHLIST_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, WatchlistItemRow>(&sql)
            .bind(user_id)
            .bind(item.offer_id)
            .bind(&item.product_title)
            .bind(&item.product_url)
            .bind(item.current_price)
            .bind(&item.source)
            .bind(&item.product_image_url)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn watchlist_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<WatchlistItem>, Box<dyn std::error::Error + Send + Sync>> {
        let sql = format!(
            r#"
            SELECT {WATCHLIST_COLUMNS}
            FROM user_watchlist
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#
        );
        let rows = sqlx::query_as::<_, WatchlistItemRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(WatchlistItem::from).collect())
    }

    async fn remove_watchlist_item(
        &self,
        user_id: i64,
        item_id: i64,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_watchlist
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(item_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn watched_offers(
        &self,
    ) -> Result<Vec<Offer>, Box<dyn std::error::Error + Send + Sync>> {
        let sql = format!(
            r#"
            SELECT {OFFER_COLUMNS}
            FROM offers
            WHERE id IN (
                SELECT DISTINCT offer_id FROM user_watchlist WHERE offer_id IS NOT NULL
            )
            "#
        );
        let rows = sqlx::query_as::<_, OfferRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Offer::from).collect())
    }

    async fn sync_watchlist_price(
        &self,
        offer_id: i64,
        price: Decimal,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            UPDATE user_watchlist
            SET current_price = $2
            WHERE offer_id = $1
            "#,
        )
        .bind(offer_id)
        .bind(price)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
