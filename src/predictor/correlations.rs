//! Feature-vs-yield correlation screen
//!
//! Pearson correlation between each input feature and observed yield, with a
//! two-tailed p-value from Student's t-distribution (statrs). Gives the fit
//! report a rough view of which inputs actually move yield in the dataset.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

use super::dataset::YieldRecord;
use crate::types::FEATURE_NAMES;

/// p-value below which a correlation is reported as significant.
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Minimum rows before a correlation can be called significant.
pub const MIN_SIGNIFICANCE_SAMPLES: usize = 30;

/// Correlation of one feature with yield
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureCorrelation {
    pub feature: String,
    pub r_value: f64,
    pub p_value: f64,
    pub sample_count: usize,
    /// `p < 0.05` with at least 30 samples
    pub significant: bool,
}

/// Correlate every feature column against yield, in column order.
pub fn feature_correlations(records: &[YieldRecord]) -> Vec<FeatureCorrelation> {
    let yields: Vec<f64> = records.iter().map(|r| r.yield_t_ha).collect();
    let n = records.len();

    FEATURE_NAMES
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let column: Vec<f64> = records.iter().map(|r| r.features()[col]).collect();
            let r = pearson(&column, &yields);
            let p_value = p_value_for_r(r, n);
            FeatureCorrelation {
                feature: (*name).to_string(),
                r_value: r,
                p_value,
                sample_count: n,
                significant: n >= MIN_SIGNIFICANCE_SAMPLES && p_value < SIGNIFICANCE_THRESHOLD,
            }
        })
        .collect()
}

/// r = Σ[(xi - x̄)(yi - ȳ)] / sqrt(Σ(xi - x̄)² × Σ(yi - ȳ)²)
fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    if x.is_empty() || x.len() != y.len() {
        return 0.0;
    }
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y.iter()).map(|(a, b)| a * b).sum();
    let sum_x2: f64 = x.iter().map(|a| a * a).sum();
    let sum_y2: f64 = y.iter().map(|a| a * a).sum();

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x.powi(2)) * (n * sum_y2 - sum_y.powi(2))).sqrt();

    if denominator == 0.0 || !denominator.is_finite() {
        0.0
    } else {
        (numerator / denominator).clamp(-1.0, 1.0)
    }
}

/// t = r × sqrt(n-2) / sqrt(1-r²), two-tailed with n-2 degrees of freedom.
fn p_value_for_r(r: f64, n: usize) -> f64 {
    if n < 3 {
        return 1.0;
    }
    if r.abs() >= 0.9999 {
        return 0.0;
    }

    let df = (n - 2) as f64;
    let t_stat = r * df.sqrt() / (1.0 - r * r).sqrt();

    match StudentsT::new(0.0, 1.0, df) {
        Ok(t_dist) => 2.0 * (1.0 - t_dist.cdf(t_stat.abs())),
        Err(_) => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<YieldRecord> {
        (0..n)
            .map(|i| {
                let x = i as f64;
                YieldRecord {
                    nitrogen: 50.0 + x * 3.0,
                    phosphorus: 60.0,
                    potassium: 20.0 + ((i * 17) % 11) as f64,
                    soil_ph: 6.5,
                    rainfall: 100.0 + ((i * 7) % 5) as f64,
                    sunlight: 7.0,
                    yield_t_ha: 5.0 + x * 0.2,
                }
            })
            .collect()
    }

    #[test]
    fn perfectly_correlated_feature_is_significant() {
        let result = feature_correlations(&rows(40));
        let nitrogen = &result[0];
        assert_eq!(nitrogen.feature, "Nitrogen");
        assert!((nitrogen.r_value - 1.0).abs() < 1e-9);
        assert_eq!(nitrogen.p_value, 0.0);
        assert!(nitrogen.significant);
    }

    #[test]
    fn constant_feature_has_zero_correlation() {
        let result = feature_correlations(&rows(40));
        let phosphorus = &result[1];
        assert_eq!(phosphorus.r_value, 0.0);
        assert!(!phosphorus.significant);
    }

    #[test]
    fn small_samples_never_significant() {
        let result = feature_correlations(&rows(10));
        assert!(result.iter().all(|c| !c.significant));
        assert_eq!(result.len(), FEATURE_NAMES.len());
    }

    #[test]
    fn p_value_for_zero_r_is_one() {
        assert!((p_value_for_r(0.0, 50) - 1.0).abs() < 1e-12);
    }
}
