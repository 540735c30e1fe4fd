use std::sync::Arc;

use chrono::{Duration, Utc};
use futures_util::future::join_all;

use dealgrid_core::repository::DealFeedRepository;

use crate::evaluator::evaluate_group;
use crate::models::{DealRecord, QueryGroup};
use crate::ranker::rank_candidates;

#[derive(Debug, thiserror::Error)]
pub enum DealsError {
    #[error("Deal feed unavailable: {0}")]
    FeedUnavailable(String),
}

/// Scores recent offer activity into a ranked deal feed.
///
/// One invocation works on a single consistent snapshot: the clock is read
/// once and every window cutoff, recency score and output timestamp derives
/// from that instant.
pub struct DealEngine {
    feed: Arc<dyn DealFeedRepository>,
}

impl DealEngine {
    pub fn new(feed: Arc<dyn DealFeedRepository>) -> Self {
        Self { feed }
    }

    /// Build the deal feed over the trailing `hours` window, returning at
    /// most `limit` deals, best first.
    ///
    /// Failure to list the window's queries fails the whole call; failure
    /// to load any single query group only drops that group from the run.
    pub async fn recent_deals(&self, hours: i64, limit: usize) -> Result<Vec<DealRecord>, DealsError> {
        let now = Utc::now();
        let cutoff = now - Duration::hours(hours);

        // 1. Every distinct query searched inside the window
        let queries = self
            .feed
            .distinct_recent_queries(cutoff)
            .await
            .map_err(|e| DealsError::FeedUnavailable(e.to_string()))?;

        if queries.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!("Evaluating {} query groups since {}", queries.len(), cutoff);

        // 2. Load each group's offers concurrently; a group that cannot be
        //    read is skipped, not fatal
        let groups = join_all(queries.iter().map(|q| self.load_group(q, cutoff))).await;

        // 3. Per-group scoring
        let mut candidates = Vec::new();
        for group in groups.into_iter().flatten() {
            candidates.extend(evaluate_group(&group, now));
        }

        // 4. Global ranking, dedup and cut
        let ranked = rank_candidates(candidates, limit);
        tracing::info!(
            "Deal feed built: {} deals from {} query groups",
            ranked.len(),
            queries.len()
        );
        Ok(ranked.iter().map(DealRecord::from_candidate).collect())
    }

    async fn load_group(
        &self,
        normalized_query: &str,
        cutoff: chrono::DateTime<Utc>,
    ) -> Option<QueryGroup> {
        match self.feed.offers_for_query(normalized_query, cutoff).await {
            Ok(offers) => Some(QueryGroup {
                normalized_query: normalized_query.to_string(),
                offers,
            }),
            Err(e) => {
                tracing::warn!("Skipping query group '{}': {}", normalized_query, e);
                None
            }
        }
    }
}
