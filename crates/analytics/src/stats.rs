/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation; `None` for an empty slice.
pub fn stddev(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// stdev / mean. `None` when empty or when the mean is zero.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    if mean.abs() <= f64::EPSILON {
        return None;
    }
    Some(stddev(values)? / mean)
}

/// `max(0, 1 - cv)`, with a zero-mean (or empty) window scoring 0.
pub fn consistency(values: &[f64]) -> f64 {
    match coefficient_of_variation(values) {
        Some(cv) => (1.0 - cv).max(0.0),
        None => 0.0,
    }
}

pub fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_stddev() {
        assert_eq!(mean(&[]), None);
        assert!((mean(&[1.0, 2.0, 3.0]).unwrap() - 2.0).abs() < 1e-12);
        // population: sqrt(((1-2)^2 + 0 + (3-2)^2) / 3)
        assert!((stddev(&[1.0, 2.0, 3.0]).unwrap() - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(stddev(&[4.0]), Some(0.0));
    }

    #[test]
    fn identical_values_are_perfectly_consistent() {
        assert_eq!(consistency(&[3.0; 5]), 1.0);
    }

    #[test]
    fn zero_mean_window_scores_zero() {
        assert_eq!(coefficient_of_variation(&[0.0, 0.0]), None);
        assert_eq!(consistency(&[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn large_spread_floors_at_zero() {
        assert_eq!(consistency(&[0.1, 10.0, 0.1, 0.1, 0.1]), 0.0);
    }
}
