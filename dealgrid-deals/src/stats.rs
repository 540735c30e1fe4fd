//! Numeric helpers shared by the outlier filter and the scorers. Two-pass
//! formulas throughout; inputs are per-group price vectors, a few dozen
//! entries at most.

/// Arithmetic mean. Empty input yields 0.0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator). Fewer than two values
/// yields 0.0, which downstream scoring treats as "no spread".
pub fn sample_stddev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values
        .iter()
        .map(|v| {
            let d = v - mean;
            d * d
        })
        .sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Median with the average-of-middle-two rule for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_empty_slice_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_mean_basic() {
        assert!((mean(&[50.0, 52.0, 49.0, 1000.0, 51.0]) - 240.4).abs() < 1e-9);
    }

    #[test]
    fn test_sample_stddev_uses_n_minus_one() {
        let values = [50.0, 52.0, 49.0, 1000.0, 51.0];
        let m = mean(&values);
        let sd = sample_stddev(&values, m);
        // Sample (not population) deviation for this vector is ~424.63.
        assert!((sd - 424.63).abs() < 0.01, "got {sd}");
    }

    #[test]
    fn test_stddev_of_singleton_is_zero() {
        assert_eq!(sample_stddev(&[42.0], 42.0), 0.0);
        assert_eq!(sample_stddev(&[], 0.0), 0.0);
    }

    #[test]
    fn test_stddev_of_identical_values_is_zero() {
        let values = [9.99, 9.99, 9.99, 9.99];
        assert_eq!(sample_stddev(&values, mean(&values)), 0.0);
    }

    #[test]
    fn test_median_odd_and_even_counts() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_median_is_insensitive_to_input_order() {
        assert_eq!(
            median(&[1000.0, 50.0, 52.0, 49.0, 51.0]),
            median(&[49.0, 50.0, 51.0, 52.0, 1000.0])
        );
    }
}
