/// Arithmetic mean, `None` for an empty slice
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Population standard deviation
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let m = mean(data)?;
    let variance = data.iter().map(|v| (v - m).powi(2)).sum::<f64>() / data.len() as f64;
    Some(variance.sqrt())
}

/// Rounds a ratio to a whole percentage, treating an empty denominator as zero
pub fn percent(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        (numerator as f64 / denominator as f64 * 100.0).round()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_scores() {
        assert_eq!(mean(&[70.0, 80.0, 100.0, 50.0]), Some(75.0));
        assert_eq!(mean(&[20.0]), Some(20.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn std_dev_of_scores() {
        assert_eq!(std_dev(&[80.0, 80.0, 80.0]), Some(0.0));
        assert_eq!(std_dev(&[50.0, 100.0]), Some(25.0));
        let sd = std_dev(&[70.0, 80.0, 100.0, 50.0]).unwrap();
        assert!((sd - 18.027756377319946).abs() < 1e-9);
        assert_eq!(std_dev(&[]), None);
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent(1, 3), 33.0);
        assert_eq!(percent(2, 3), 67.0);
        assert_eq!(percent(1, 8), 13.0);
        assert_eq!(percent(3, 3), 100.0);
    }

    #[test]
    fn percent_of_nothing_is_zero() {
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(5, 0), 0.0);
    }
}
