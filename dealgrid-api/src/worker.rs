use std::sync::Arc;

use tokio::time::{interval, sleep, Duration};
use tracing::{error, info};
use uuid::Uuid;

use dealgrid_core::offer::Offer;
use dealgrid_core::repository::{OfferRepository, UserRepository};
use dealgrid_sources::SourceRegistry;
use dealgrid_store::app_config::RefreshConfig;

/// How much of an offer title is replayed as the refresh query. Marketplace
/// search endpoints degrade on very long queries.
const REFRESH_QUERY_MAX_CHARS: usize = 50;

/// Courtesy delay between upstream calls inside one run.
const PER_OFFER_DELAY_SECS: u64 = 1;

#[derive(Debug, Default)]
struct RefreshSummary {
    updated: usize,
    unchanged: usize,
    failed: usize,
}

/// Periodically re-price every offer referenced by a watchlist entry. Runs
/// once at startup, then on the configured interval.
pub async fn start_refresh_worker(
    config: RefreshConfig,
    user_repo: Arc<dyn UserRepository>,
    offer_repo: Arc<dyn OfferRepository>,
    sources: Arc<SourceRegistry>,
) {
    if !config.enabled {
        info!("Price refresh worker disabled by config");
        return;
    }

    let mut ticker = interval(Duration::from_secs(config.interval_hours * 3600));
    info!(
        "Price refresh worker started (every {}h)",
        config.interval_hours
    );

    loop {
        ticker.tick().await;

        let run_id = Uuid::new_v4();
        info!("Price refresh run {} starting", run_id);

        match refresh_watched_offers(&user_repo, &offer_repo, &sources).await {
            Ok(summary) => info!(
                "Price refresh run {} finished: {} updated, {} unchanged, {} failed",
                run_id, summary.updated, summary.unchanged, summary.failed
            ),
            Err(e) => error!("Price refresh run {} aborted: {}", run_id, e),
        }
    }
}

async fn refresh_watched_offers(
    user_repo: &Arc<dyn UserRepository>,
    offer_repo: &Arc<dyn OfferRepository>,
    sources: &Arc<SourceRegistry>,
) -> Result<RefreshSummary, Box<dyn std::error::Error + Send + Sync>> {
    let offers = user_repo.watched_offers().await?;
    info!("Refreshing prices for {} watched offers", offers.len());

    let mut summary = RefreshSummary::default();
    for offer in offers {
        match refresh_offer(&offer, user_repo, offer_repo, sources).await {
            Ok(true) => summary.updated += 1,
            Ok(false) => summary.unchanged += 1,
            Err(e) => {
                error!(
                    "Price refresh failed for offer {} ('{}'): {}",
                    offer.id, offer.title, e
                );
                summary.failed += 1;
            }
        }

        sleep(Duration::from_secs(PER_OFFER_DELAY_SECS)).await;
    }

    Ok(summary)
}

/// Re-price one offer against its own marketplace. Returns whether the
/// stored price changed.
async fn refresh_offer(
    offer: &Offer,
    user_repo: &Arc<dyn UserRepository>,
    offer_repo: &Arc<dyn OfferRepository>,
    sources: &Arc<SourceRegistry>,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    // 1. Replay a search on the marketplace the offer came from
    let Some(client) = sources.client_for(&offer.source) else {
        return Err(format!("No source adapter enabled for '{}'", offer.source).into());
    };

    let query: String = offer.title.chars().take(REFRESH_QUERY_MAX_CHARS).collect();
    let results = client.search(&query).await?;

    // 2. Prefer the exact listing; fall back to the top result
    let fresh = results
        .iter()
        .find(|o| o.source_offer_id == offer.source_offer_id)
        .or_else(|| results.first())
        .ok_or("Search returned no results")?;

    // 3. Persist the observation. History is appended either way; last_price
    //    and watchlist rows only move when the price did.
    let changed = fresh.price != offer.last_price;
    offer_repo
        .apply_price_refresh(offer.id, fresh.price, &fresh.currency)
        .await?;

    if changed {
        user_repo.sync_watchlist_price(offer.id, fresh.price).await?;
        info!(
            "Offer {} price moved {} -> {}",
            offer.id, offer.last_price, fresh.price
        );
    }

    Ok(changed)
}
