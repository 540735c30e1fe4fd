use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A registered account. The password never leaves the store as anything but
/// a bcrypt hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A watchlist entry. Product fields are denormalized so the entry survives
/// offer deletion; `offer_id` links back to the live offer when one exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistItem {
    pub id: i64,
    pub user_id: i64,
    pub offer_id: Option<i64>,
    pub product_title: String,
    pub product_url: Option<String>,
    pub current_price: Option<Decimal>,
    pub source: Option<String>,
    pub product_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewWatchlistItem {
    pub offer_id: Option<i64>,
    pub product_title: String,
    pub product_url: Option<String>,
    pub current_price: Option<Decimal>,
    pub source: Option<String>,
    pub product_image_url: Option<String>,
}
