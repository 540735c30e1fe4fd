use std::collections::HashSet;

use crate::models::ScoredCandidate;

/// Merge the per-group shortlists into the final feed: sort by meta score
/// descending (ties broken by offer identity), drop repeat sightings of
/// the same (source, source_offer_id) keeping only the highest-scoring
/// one, and cut to `limit`.
///
/// The same physical listing can reach here through several query groups
/// ("airpods pro" and "airpods pro 2" both matching one listing), scored
/// differently in each; first occurrence after the sort is the best.
pub fn rank_candidates(
    mut candidates: Vec<ScoredCandidate>,
    limit: usize,
) -> Vec<ScoredCandidate> {
    if limit == 0 {
        return Vec::new();
    }

    candidates.sort_by(|a, b| a.compare_rank(b));

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut ranked = Vec::with_capacity(limit.min(candidates.len()));
    for candidate in candidates {
        let key = (
            candidate.offer.source.clone(),
            candidate.offer.source_offer_id.clone(),
        );
        if seen.insert(key) {
            ranked.push(candidate);
            if ranked.len() >= limit {
                break;
            }
        }
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dealgrid_core::offer::OfferSample;
    use rust_decimal_macros::dec;

    fn candidate(source: &str, source_offer_id: &str, meta: f64) -> ScoredCandidate {
        let now = Utc::now();
        ScoredCandidate {
            offer: OfferSample {
                offer_id: 7,
                source: source.to_string(),
                source_offer_id: source_offer_id.to_string(),
                title: "Mechanical Keyboard".to_string(),
                last_price: dec!(79.00),
                currency: "USD".to_string(),
                url: "https://example.com/kb".to_string(),
                seller: None,
                image_url: None,
                rating: None,
                created_at: now,
                seen_at: now,
            },
            discount_score: 0.0,
            rating_score: 0.0,
            recency_score: 0.0,
            meta_score: meta,
            avg_price: 100.0,
            discount_percentage: 0.0,
        }
    }

    #[test]
    fn test_orders_by_meta_score_descending() {
        let ranked = rank_candidates(
            vec![
                candidate("ebay", "a", 0.31),
                candidate("ebay", "b", 0.92),
                candidate("amazon", "c", 0.55),
            ],
            10,
        );
        let scores: Vec<f64> = ranked.iter().map(|c| c.meta_score).collect();
        assert_eq!(scores, vec![0.92, 0.55, 0.31]);
    }

    #[test]
    fn test_duplicate_identity_keeps_best_scoring_instance() {
        // Same listing surfaced through two query groups with different
        // scores; only the 0.9 instance survives.
        let ranked = rank_candidates(
            vec![
                candidate("ebay", "x", 0.4),
                candidate("ebay", "x", 0.9),
                candidate("amazon", "x", 0.5),
            ],
            10,
        );
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].meta_score, 0.9);
        assert_eq!(ranked[0].offer.source, "ebay");
        // "x" on a different source is a different listing.
        assert_eq!(ranked[1].offer.source, "amazon");
    }

    #[test]
    fn test_truncates_to_limit_after_dedup() {
        let mut input = Vec::new();
        for i in 0..10 {
            input.push(candidate("ebay", &format!("id-{i}"), i as f64 / 10.0));
            // a duplicate of each that must not eat into the limit
            input.push(candidate("ebay", &format!("id-{i}"), 0.01));
        }
        let ranked = rank_candidates(input, 4);
        assert_eq!(ranked.len(), 4);
        assert_eq!(ranked[0].offer.source_offer_id, "id-9");
        assert_eq!(ranked[3].offer.source_offer_id, "id-6");
    }

    #[test]
    fn test_limit_zero_and_limit_beyond_pool() {
        assert!(rank_candidates(vec![candidate("ebay", "a", 0.5)], 0).is_empty());
        let ranked = rank_candidates(vec![candidate("ebay", "a", 0.5)], 50);
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_tied_scores_are_stable_across_runs() {
        let build = || {
            vec![
                candidate("ebay", "zz", 0.5),
                candidate("amazon", "aa", 0.5),
                candidate("dummyjson", "mm", 0.5),
            ]
        };
        let first = rank_candidates(build(), 3);
        let second = rank_candidates(build(), 3);
        let order: Vec<&str> = first.iter().map(|c| c.offer.source.as_str()).collect();
        assert_eq!(order, vec!["amazon", "dummyjson", "ebay"]);
        assert_eq!(
            order,
            second
                .iter()
                .map(|c| c.offer.source.as_str())
                .collect::<Vec<_>>()
        );
    }
}
