use std::net::SocketAddr;
use std::sync::Arc;

use dealgrid_api::{
    app,
    state::{AppState, AuthConfig},
    worker,
};
use dealgrid_deals::DealEngine;
use dealgrid_sources::SourceRegistry;
use dealgrid_store::{
    PostgresDealFeedRepository, PostgresOfferRepository, PostgresSearchRepository,
    PostgresUserRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "dealgrid_api=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = dealgrid_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting DealGrid API on port {}", config.server.port);

    // Postgres connection + migrations
    let db = dealgrid_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    // Redis Connection
    let redis_client = dealgrid_store::RedisClient::new(&config.redis.url)
        .await
        .expect("Failed to connect to Redis");
    let redis_arc = Arc::new(redis_client);

    // Repositories share the one pool
    let search_repo = Arc::new(PostgresSearchRepository {
        pool: db.pool.clone(),
    });
    let offer_repo = Arc::new(PostgresOfferRepository {
        pool: db.pool.clone(),
    });
    let user_repo = Arc::new(PostgresUserRepository {
        pool: db.pool.clone(),
    });
    let feed_repo = Arc::new(PostgresDealFeedRepository {
        pool: db.pool.clone(),
    });

    let deal_engine = Arc::new(DealEngine::new(feed_repo));
    let sources = Arc::new(SourceRegistry::from_config(&config.sources));

    // Background price refresh for watchlist offers
    tokio::spawn(worker::start_refresh_worker(
        config.refresh.clone(),
        user_repo.clone(),
        offer_repo.clone(),
        sources.clone(),
    ));

    let app_state = AppState {
        search_repo,
        offer_repo,
        user_repo,
        deal_engine,
        sources,
        redis: redis_arc,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        search: config.search.clone(),
        rate_limit: config.rate_limit.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
