use std::sync::Arc;

use dealgrid_core::repository::{OfferRepository, SearchRepository, UserRepository};
use dealgrid_deals::DealEngine;
use dealgrid_sources::SourceRegistry;
use dealgrid_store::app_config::{RateLimitConfig, SearchConfig};
use dealgrid_store::RedisClient;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub search_repo: Arc<dyn SearchRepository>,
    pub offer_repo: Arc<dyn OfferRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub deal_engine: Arc<DealEngine>,
    pub sources: Arc<SourceRegistry>,
    pub redis: Arc<RedisClient>,
    pub auth: AuthConfig,
    pub search: SearchConfig,
    pub rate_limit: RateLimitConfig,
}
