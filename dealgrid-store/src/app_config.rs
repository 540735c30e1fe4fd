use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub search: SearchConfig,
    pub rate_limit: RateLimitConfig,
    pub sources: SourcesConfig,
    pub refresh: RefreshConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// A search for the same normalized query younger than this is served
    /// from storage instead of hitting the marketplaces again.
    pub cache_max_age_minutes: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    pub requests_per_minute: i64,
}

/// Marketplace credentials. eBay and Amazon are optional; a missing section
/// disables that source. DummyJSON needs no credentials and is always on.
#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    pub ebay: Option<EbayConfig>,
    pub amazon: Option<AmazonConfig>,
    pub dummyjson: DummyJsonConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EbayConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_ebay_api_base")]
    pub api_base_url: String,
    #[serde(default = "default_ebay_oauth_url")]
    pub oauth_url: String,
}

fn default_ebay_api_base() -> String {
    "https://api.sandbox.ebay.com/buy/browse/v1".to_string()
}

fn default_ebay_oauth_url() -> String {
    "https://api.sandbox.ebay.com/identity/v1/oauth2/token".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AmazonConfig {
    pub api_key: String,
    #[serde(default = "default_amazon_base_url")]
    pub base_url: String,
    #[serde(default = "default_amazon_host")]
    pub host: String,
}

fn default_amazon_base_url() -> String {
    "https://real-time-amazon-data.p.rapidapi.com/search".to_string()
}

fn default_amazon_host() -> String {
    "real-time-amazon-data.p.rapidapi.com".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DummyJsonConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshConfig {
    pub enabled: bool,
    pub interval_hours: u64,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of DEALGRID)
            // Eg.. `DEALGRID__SERVER__PORT=8080` would set `server.port`
            .add_source(config::Environment::with_prefix("DEALGRID").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
