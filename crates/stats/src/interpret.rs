//! Narrative conclusions for test results.
//!
//! Thresholds: Pearson and Shapiro-Wilk conclude "no effect" when p > alpha;
//! Chi-squared concludes "association" when p <= alpha.

/// No significant linear association between two close series.
pub fn pearson(coefficient: f64, p_value: f64, alpha: f64) -> String {
    if p_value > alpha {
        format!(
            "No significant linear association (r = {:.3}, p = {:.3} > {})",
            coefficient, p_value, alpha
        )
    } else {
        let direction = if coefficient >= 0.0 { "positive" } else { "negative" };
        format!(
            "Significant {} linear association (r = {:.3}, p = {:.3e} <= {})",
            direction, coefficient, p_value, alpha
        )
    }
}

/// Whether one close series looks normally distributed.
pub fn shapiro(statistic: f64, p_value: f64, alpha: f64) -> String {
    if p_value > alpha {
        format!(
            "Consistent with normal distribution (W = {:.3}, p = {:.3} > {})",
            statistic, p_value, alpha
        )
    } else {
        format!(
            "Not normally distributed; prefer non-parametric methods (W = {:.3}, p = {:.3e} <= {})",
            statistic, p_value, alpha
        )
    }
}

/// Whether monthly trend directions of two assets are associated.
pub fn chi_square(statistic: f64, p_value: f64, alpha: f64) -> String {
    if p_value <= alpha {
        format!(
            "Statistically significant association of monthly trends (chi2 = {:.3}, p = {:.3e} <= {})",
            statistic, p_value, alpha
        )
    } else {
        format!(
            "No significant association of monthly trends (chi2 = {:.3}, p = {:.3} > {})",
            statistic, p_value, alpha
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pearson_threshold() {
        assert!(pearson(0.1, 0.2, 0.05).starts_with("No significant linear association"));
        assert!(pearson(0.9, 0.05, 0.05).starts_with("Significant positive"));
        assert!(pearson(-0.9, 0.001, 0.05).starts_with("Significant negative"));
    }

    #[test]
    fn test_shapiro_threshold() {
        assert!(shapiro(0.98, 0.4, 0.05).starts_with("Consistent with normal distribution"));
        assert!(shapiro(0.80, 0.05, 0.05).starts_with("Not normally distributed"));
    }

    #[test]
    fn test_chi_square_threshold() {
        assert!(chi_square(8.3, 0.05, 0.05).starts_with("Statistically significant association"));
        assert!(chi_square(0.0, 1.0, 0.05).starts_with("No significant association"));
    }
}
