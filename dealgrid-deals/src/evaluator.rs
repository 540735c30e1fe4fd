use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::models::{QueryGroup, ScoredCandidate};
use crate::outlier::remove_low_price_outliers;
use crate::scoring::{discount_score, meta_score, rating_score, recency_score};
use crate::stats;

/// Groups with fewer raw offers than this carry no pricing signal and are
/// skipped outright.
pub const MIN_GROUP_SIZE: usize = 5;

/// Each query group contributes at most this many candidates to the
/// global ranking.
pub const MAX_PER_GROUP: usize = 3;

/// Score one query group: filter low-price outliers, compute the group
/// average and sample deviation over the filtered set, score every offer
/// whose price survived filtering, and return the top candidates by meta
/// score.
pub fn evaluate_group(group: &QueryGroup, now: DateTime<Utc>) -> Vec<ScoredCandidate> {
    if group.offers.len() < MIN_GROUP_SIZE {
        tracing::debug!(
            "Skipping group '{}': only {} offers in window",
            group.normalized_query,
            group.offers.len()
        );
        return Vec::new();
    }

    // 1. Collect prices and strip accessory-level outliers
    let prices: Vec<f64> = group.offers.iter().map(|o| o.price_f64()).collect();
    let filtered = remove_low_price_outliers(&prices);

    // 2. Group statistics over the filtered set only
    let avg_price = stats::mean(&filtered);
    let std_dev = stats::sample_stddev(&filtered, avg_price);

    // Membership by price value: an offer is scored only if its price made
    // it through the filter. Bit-identity is safe here, both vectors come
    // from the same Decimal -> f64 conversion.
    let surviving: HashSet<u64> = filtered.iter().map(|p| p.to_bits()).collect();

    // 3. Score every surviving offer
    let mut candidates = Vec::new();
    for offer in &group.offers {
        let price = offer.price_f64();
        if !surviving.contains(&price.to_bits()) {
            continue;
        }

        let discount = discount_score(price, avg_price, std_dev);
        let rating = rating_score(offer.rating_f64());
        let recency = recency_score(offer.seen_at, now);

        let discount_percentage = if avg_price > 0.0 {
            (avg_price - price) / avg_price * 100.0
        } else {
            0.0
        };

        candidates.push(ScoredCandidate {
            offer: offer.clone(),
            discount_score: discount,
            rating_score: rating,
            recency_score: recency,
            meta_score: meta_score(discount, rating, recency),
            avg_price,
            discount_percentage,
        });
    }

    // 4. Keep the group's best few
    candidates.sort_by(|a, b| a.compare_rank(b));
    candidates.truncate(MAX_PER_GROUP);
    candidates
}
