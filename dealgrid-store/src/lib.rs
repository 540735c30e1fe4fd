pub mod app_config;
pub mod database;
pub mod deal_repo;
pub mod offer_repo;
pub mod redis_repo;
pub mod search_repo;
pub mod user_repo;

pub use database::DbClient;
pub use deal_repo::PostgresDealFeedRepository;
pub use offer_repo::PostgresOfferRepository;
pub use redis_repo::RedisClient;
pub use search_repo::PostgresSearchRepository;
pub use user_repo::PostgresUserRepository;
