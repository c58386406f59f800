//! Small descriptive statistics shared by the scoring rules and dashboards.

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance (divides by `n`).
pub fn variance(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let squared = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>();
    Some(squared / values.len() as f64)
}

pub fn std_dev(values: &[f64]) -> Option<f64> {
    variance(values).map(f64::sqrt)
}

/// `stddev / mean`; `None` when there are no samples or the mean is zero.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    if mean == 0.0 {
        return None;
    }
    std_dev(values).map(|deviation| deviation / mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_statistics() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&values), Some(5.0));
        assert_eq!(variance(&values), Some(4.0));
        assert_eq!(std_dev(&values), Some(2.0));
        assert_eq!(coefficient_of_variation(&values), Some(0.4));
    }

    #[test]
    fn degenerate_inputs_yield_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(std_dev(&[]), None);
        assert_eq!(coefficient_of_variation(&[0.0, 0.0]), None);
    }
}
