//! Low-price outlier removal. Marketplace search results for a product
//! query routinely include accessories (cases, cables, skins) priced far
//! below the product itself; left in, they drag the group average down and
//! make every real listing look like a discount. Only the LOW side is
//! filtered: an absurdly expensive listing hurts nobody's score but its own.

use crate::stats;

/// Below this many samples the filter stays out of the way entirely.
const MIN_SAMPLES: usize = 5;

/// Groups whose median price is below this are cheap-item searches where
/// "35% of median" would shave off legitimate listings.
const LOW_MEDIAN_CUTOFF: f64 = 10.0;

/// Prices below `median * THRESHOLD_RATIO` are treated as accessories.
const THRESHOLD_RATIO: f64 = 0.35;

/// Revert to the unfiltered set when filtering would keep less than this
/// share of the group.
const KEEP_FLOOR_RATIO: f64 = 0.5;

/// Revert when fewer than this many prices survive.
const MIN_SURVIVORS: usize = 3;

/// Drop implausibly low prices from a group, returning the original set
/// whenever the filter cannot act safely:
/// - fewer than 5 samples, or an all-cheap group (median < 10): unchanged
/// - filtering would discard half or more of the group: unchanged
/// - fewer than 3 survivors: unchanged
pub fn remove_low_price_outliers(prices: &[f64]) -> Vec<f64> {
    if prices.len() < MIN_SAMPLES {
        return prices.to_vec();
    }

    let median = match stats::median(prices) {
        Some(m) => m,
        None => return prices.to_vec(),
    };
    if median < LOW_MEDIAN_CUTOFF {
        return prices.to_vec();
    }

    let threshold = median * THRESHOLD_RATIO;
    let filtered: Vec<f64> = prices.iter().copied().filter(|p| *p >= threshold).collect();

    if (filtered.len() as f64) < prices.len() as f64 * KEEP_FLOOR_RATIO {
        tracing::debug!(
            "Outlier filter would drop {} of {} prices, keeping original set",
            prices.len() - filtered.len(),
            prices.len()
        );
        return prices.to_vec();
    }
    if filtered.len() < MIN_SURVIVORS {
        return prices.to_vec();
    }

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_spike_is_not_filtered() {
        // A single expensive listing is not a low outlier; the group is
        // passed through untouched and the spike is handled by scoring.
        let prices = vec![50.0, 52.0, 49.0, 1000.0, 51.0];
        assert_eq!(remove_low_price_outliers(&prices), prices);
    }

    #[test]
    fn test_cheap_group_bypasses_filter() {
        // Median below 10 marks a cheap-item search; the ratio test never
        // runs and the spike stays in.
        let prices = vec![5.0, 6.0, 5.0, 4.0, 1000.0];
        assert_eq!(remove_low_price_outliers(&prices), prices);
    }

    #[test]
    fn test_accessory_price_is_dropped() {
        let prices = vec![100.0, 110.0, 120.0, 105.0, 2.0];
        // median 105, threshold 36.75; only the 2.0 accessory goes.
        assert_eq!(
            remove_low_price_outliers(&prices),
            vec![100.0, 110.0, 120.0, 105.0]
        );
    }

    #[test]
    fn test_small_groups_are_untouched() {
        let prices = vec![100.0, 2.0, 110.0, 120.0];
        assert_eq!(remove_low_price_outliers(&prices), prices);
    }

    #[test]
    fn test_accessory_heavy_group_keeps_original_set() {
        // When accessories dominate the group, the median itself lands in
        // accessory range and the cheap-group bypass keeps the set intact
        // instead of dropping the majority.
        let prices = vec![30.0, 1.0, 2.0, 3.0, 4.0, 90.0, 95.0];
        assert_eq!(remove_low_price_outliers(&prices), prices);
    }

    #[test]
    fn test_dropping_exactly_half_is_allowed() {
        // 6 prices, 3 survive: 3 is not less than 6 * 0.5, and meets the
        // minimum survivor count.
        let prices = vec![100.0, 90.0, 1.0, 2.0, 3.0, 95.0];
        assert_eq!(
            remove_low_price_outliers(&prices),
            vec![100.0, 90.0, 95.0]
        );
    }

    #[test]
    fn test_uniform_prices_pass_through() {
        let prices = vec![49.99; 8];
        assert_eq!(remove_low_price_outliers(&prices), prices);
    }
}
