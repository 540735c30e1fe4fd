//! Component scorers and the weighted meta score. Every component maps
//! into [0, 1]; the blend weights sum to 1.0 so the meta score does too.

use chrono::{DateTime, Utc};

pub const DISCOUNT_WEIGHT: f64 = 0.60;
pub const RATING_WEIGHT: f64 = 0.30;
pub const RECENCY_WEIGHT: f64 = 0.10;

/// z-score at which the discount component saturates at 1.0. Two sample
/// deviations below the group average is already an exceptional price.
const Z_SATURATION: f64 = 2.0;

const RATING_SCALE_MAX: f64 = 5.0;

/// Offers seen within this many hours score full recency.
const FULL_RECENCY_HOURS: f64 = 24.0;

/// Recency decays linearly to zero at this age.
const RECENCY_LIMIT_HOURS: f64 = 48.0;

/// How far below the group average a price sits, as a z-score mapped into
/// [0, 1]. Prices at or above the average score 0. A zero standard
/// deviation (uniform group) falls back to relative distance from the
/// average; a non-positive average scores 0 outright.
pub fn discount_score(price: f64, avg_price: f64, std_dev: f64) -> f64 {
    if avg_price <= 0.0 {
        return 0.0;
    }
    if std_dev == 0.0 {
        return ((avg_price - price) / avg_price).max(0.0);
    }
    let z = (avg_price - price) / std_dev;
    (z / Z_SATURATION).clamp(0.0, 1.0)
}

/// Seller/product rating normalized from the marketplace 0-5 scale.
/// Missing ratings score 0 rather than a neutral midpoint.
pub fn rating_score(rating: Option<f64>) -> f64 {
    match rating {
        Some(r) => r / RATING_SCALE_MAX,
        None => 0.0,
    }
}

/// Freshness of the sighting: 1.0 inside the first 24 hours, linear decay
/// to 0.0 at 48 hours, 0.0 after that.
pub fn recency_score(seen_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let hours = (now - seen_at).num_milliseconds() as f64 / 3_600_000.0;
    if hours <= FULL_RECENCY_HOURS {
        1.0
    } else if hours <= RECENCY_LIMIT_HOURS {
        (RECENCY_LIMIT_HOURS - hours) / (RECENCY_LIMIT_HOURS - FULL_RECENCY_HOURS)
    } else {
        0.0
    }
}

/// Weighted blend of the three components: 60% discount, 30% rating,
/// 10% recency.
pub fn meta_score(discount: f64, rating: f64, recency: f64) -> f64 {
    discount * DISCOUNT_WEIGHT + rating * RATING_WEIGHT + recency * RECENCY_WEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_discount_score_maps_z_into_unit_interval() {
        // Group [50, 52, 49, 1000, 51]: avg 240.4, sample stddev ~424.63.
        // The 49.00 listing sits 0.45 deviations below average -> ~0.225.
        let score = discount_score(49.0, 240.4, 424.63);
        assert!((score - 0.2254).abs() < 0.001, "got {score}");
    }

    #[test]
    fn test_discount_score_clamps_above_average_prices_to_zero() {
        assert_eq!(discount_score(1000.0, 240.4, 424.63), 0.0);
        assert_eq!(discount_score(240.4, 240.4, 424.63), 0.0);
    }

    #[test]
    fn test_discount_score_saturates_at_two_deviations() {
        // price 3 deviations under the average still scores exactly 1.0.
        assert_eq!(discount_score(100.0, 400.0, 100.0), 1.0);
    }

    #[test]
    fn test_discount_score_zero_stddev_uses_relative_distance() {
        assert!((discount_score(80.0, 100.0, 0.0) - 0.2).abs() < 1e-9);
        // Above-average price in a uniform group floors at 0.
        assert_eq!(discount_score(120.0, 100.0, 0.0), 0.0);
        assert_eq!(discount_score(100.0, 100.0, 0.0), 0.0);
    }

    #[test]
    fn test_discount_score_non_positive_average_is_zero() {
        assert_eq!(discount_score(10.0, 0.0, 5.0), 0.0);
        assert_eq!(discount_score(10.0, -3.0, 5.0), 0.0);
    }

    #[test]
    fn test_discount_score_is_monotone_in_price() {
        let avg = 200.0;
        let sd = 50.0;
        let mut last = f64::INFINITY;
        for price in [50.0, 100.0, 150.0, 180.0, 200.0, 250.0] {
            let s = discount_score(price, avg, sd);
            assert!(s <= last, "score rose from {last} to {s} at price {price}");
            assert!((0.0..=1.0).contains(&s));
            last = s;
        }
    }

    #[test]
    fn test_rating_score_scales_out_of_five() {
        assert_eq!(rating_score(Some(5.0)), 1.0);
        assert!((rating_score(Some(4.0)) - 0.8).abs() < 1e-9);
        assert_eq!(rating_score(None), 0.0);
    }

    #[test]
    fn test_recency_score_tiers() {
        let now = Utc::now();
        assert_eq!(recency_score(now, now), 1.0);
        assert_eq!(recency_score(now - Duration::hours(24), now), 1.0);
        let mid = recency_score(now - Duration::hours(36), now);
        assert!((mid - 0.5).abs() < 1e-6, "got {mid}");
        assert_eq!(recency_score(now - Duration::hours(48), now), 0.0);
        assert_eq!(recency_score(now - Duration::hours(72), now), 0.0);
    }

    #[test]
    fn test_meta_score_weights() {
        assert!((meta_score(1.0, 1.0, 1.0) - 1.0).abs() < 1e-9);
        assert!((meta_score(1.0, 0.0, 0.0) - 0.6).abs() < 1e-9);
        assert!((meta_score(0.0, 1.0, 0.0) - 0.3).abs() < 1e-9);
        assert!((meta_score(0.0, 0.0, 1.0) - 0.1).abs() < 1e-9);
        assert!((meta_score(0.5, 0.8, 1.0) - 0.64).abs() < 1e-9);
    }
}
