use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::offer::{NewOffer, Offer, OfferSample, PricePoint};
use crate::search::Search;
use crate::user::{NewWatchlistItem, User, WatchlistItem};

/// Sort column for offer listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferSort {
    LastPrice,
    Rating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Repository trait for search records.
#[async_trait]
pub trait SearchRepository: Send + Sync {
    async fn create_search(
        &self,
        query: &str,
        normalized_query: &str,
        filters: Option<&str>,
        user_id: Option<i64>,
    ) -> Result<Search, Box<dyn std::error::Error + Send + Sync>>;

    async fn recent_searches(
        &self,
        limit: i64,
    ) -> Result<Vec<Search>, Box<dyn std::error::Error + Send + Sync>>;

    async fn recent_searches_for_user(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<Search>, Box<dyn std::error::Error + Send + Sync>>;

    /// Most recent search for a normalized query, regardless of age.
    /// Callers decide whether it is fresh enough to serve as a cache hit.
    async fn latest_search_for_query(
        &self,
        normalized_query: &str,
    ) -> Result<Option<Search>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for offer storage and price history.
#[async_trait]
pub trait OfferRepository: Send + Sync {
    /// Upsert a batch of normalized offers for one search: update price and
    /// rating on (source, source_offer_id) conflict, link every offer to the
    /// search, and append a price-history row per offer.
    async fn ingest_offers(
        &self,
        search_id: i64,
        offers: &[NewOffer],
    ) -> Result<Vec<Offer>, Box<dyn std::error::Error + Send + Sync>>;

    async fn offers_for_search(
        &self,
        search_id: i64,
        page: i64,
        page_size: i64,
        sort: OfferSort,
        order: SortOrder,
    ) -> Result<Vec<Offer>, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_offer(
        &self,
        offer_id: i64,
    ) -> Result<Option<Offer>, Box<dyn std::error::Error + Send + Sync>>;

    async fn price_history(
        &self,
        offer_id: i64,
    ) -> Result<Vec<PricePoint>, Box<dyn std::error::Error + Send + Sync>>;

    /// Record a fresh price observation from the refresh worker: update
    /// last_price/last_seen_at and append a price-history row.
    async fn apply_price_refresh(
        &self,
        offer_id: i64,
        price: Decimal,
        currency: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Storage collaborator for the deal scoring engine: the two snapshot queries
/// it consumes. Implementations must annotate each offer with the most recent
/// qualifying search timestamp for its group.
#[async_trait]
pub trait DealFeedRepository: Send + Sync {
    /// Distinct normalized queries with at least one search at or after the cutoff.
    async fn distinct_recent_queries(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>>;

    /// Offers linked to any qualifying search for the query, each annotated
    /// with its most recent qualifying search timestamp.
    async fn offers_for_query(
        &self,
        normalized_query: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<OfferSample>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for accounts and watchlists.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        hashed_password: &str,
        full_name: Option<&str>,
    ) -> Result<User, Box<dyn std::error::Error + Send + Sync>>;

    async fn find_by_id(
        &self,
        user_id: i64,
    ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>>;

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>>;

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>>;

    async fn add_watchlist_item(
        &self,
        user_id: i64,
        item: &NewWatchlistItem,
    ) -> Result<WatchlistItem, Box<dyn std::error::Error + Send + Sync>>;

    async fn watchlist_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<WatchlistItem>, Box<dyn std::error::Error + Send + Sync>>;

    /// Remove an item the user owns. Returns false when no such row exists,
    /// so handlers can answer 404 without a prior lookup.
    async fn remove_watchlist_item(
        &self,
        user_id: i64,
        item_id: i64,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Distinct offers referenced by any watchlist entry; the refresh worker
    /// polls exactly this set.
    async fn watched_offers(
        &self,
    ) -> Result<Vec<Offer>, Box<dyn std::error::Error + Send + Sync>>;

    /// Propagate a refreshed price into denormalized watchlist rows.
    async fn sync_watchlist_price(
        &self,
        offer_id: i64,
        price: Decimal,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
