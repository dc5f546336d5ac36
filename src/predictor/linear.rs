//! Least-squares yield model
//!
//! Fits `yield = b0 + Σ bi·xi` over the six features with an SVD solve, so a
//! tall design matrix (many rows, 7 columns) is handled without forming the
//! normal equations.

use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use super::correlations::{feature_correlations, FeatureCorrelation};
use super::dataset::YieldRecord;
use super::{PredictorError, YieldPredictor};
use crate::types::{PredictionQuery, FEATURE_NAMES, NUM_FEATURES};

/// Intercept plus one coefficient per feature.
const NUM_PARAMS: usize = NUM_FEATURES + 1;

/// Singular-value tolerances tried in order, strictest first.
const SVD_TOLERANCES: [f64; 3] = [1e-10, 1e-8, 1e-6];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FitError {
    #[error("Insufficient training rows: need {needed}, have {have}")]
    InsufficientRows { needed: usize, have: usize },

    #[error("Design matrix is too ill-conditioned to solve")]
    IllConditioned,
}

/// Summary of a fitted model for display
#[derive(Debug, Clone, Serialize)]
pub struct FitReport {
    pub rows: usize,
    /// Coefficient of determination on the training rows
    pub r_squared: f64,
    pub intercept: f64,
    /// `(feature name, coefficient)` in column order
    pub coefficients: Vec<(String, f64)>,
    pub correlations: Vec<FeatureCorrelation>,
}

/// Ordinary-least-squares yield predictor
#[derive(Debug, Clone)]
pub struct LinearYieldModel {
    intercept: f64,
    coefficients: [f64; NUM_FEATURES],
    rows: usize,
    r_squared: f64,
    correlations: Vec<FeatureCorrelation>,
}

impl LinearYieldModel {
    /// Fit on labelled rows.
    pub fn fit(records: &[YieldRecord]) -> Result<Self, FitError> {
        let n = records.len();
        if n < NUM_PARAMS {
            return Err(FitError::InsufficientRows {
                needed: NUM_PARAMS,
                have: n,
            });
        }

        let x = DMatrix::from_fn(n, NUM_PARAMS, |r, c| {
            if c == 0 {
                1.0
            } else {
                records[r].features()[c - 1]
            }
        });
        let y = DVector::from_iterator(n, records.iter().map(|r| r.yield_t_ha));

        let beta = solve_least_squares(&x, &y).ok_or(FitError::IllConditioned)?;

        let mut coefficients = [0.0; NUM_FEATURES];
        for (i, c) in coefficients.iter_mut().enumerate() {
            *c = beta[i + 1];
        }

        let fitted = &x * &beta;
        let r_squared = r_squared(&y, &fitted);

        let model = Self {
            intercept: beta[0],
            coefficients,
            rows: n,
            r_squared,
            correlations: feature_correlations(records),
        };
        info!(rows = n, r_squared = format!("{r_squared:.3}"), "Fitted linear yield model");
        Ok(model)
    }

    pub const fn intercept(&self) -> f64 {
        self.intercept
    }

    pub const fn coefficients(&self) -> &[f64; NUM_FEATURES] {
        &self.coefficients
    }

    pub const fn r_squared(&self) -> f64 {
        self.r_squared
    }

    fn predict_features(&self, features: &[f64; NUM_FEATURES]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(b, x)| b * x)
                .sum::<f64>()
    }

    pub fn report(&self) -> FitReport {
        FitReport {
            rows: self.rows,
            r_squared: self.r_squared,
            intercept: self.intercept,
            coefficients: FEATURE_NAMES
                .iter()
                .zip(self.coefficients)
                .map(|(name, c)| ((*name).to_string(), c))
                .collect(),
            correlations: self.correlations.clone(),
        }
    }
}

impl YieldPredictor for LinearYieldModel {
    fn predict(&self, query: &PredictionQuery) -> Result<f64, PredictorError> {
        let value = self.predict_features(&query.features());
        if value.is_finite() {
            Ok(value)
        } else {
            Err(PredictorError::NonFinite { value })
        }
    }

    fn name(&self) -> &str {
        "linear-ols"
    }
}

/// Solve `min ‖xβ − y‖²`, relaxing the SVD tolerance if the strict solve fails.
fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);
    SVD_TOLERANCES.iter().find_map(|&tol| {
        svd.solve(y, tol)
            .ok()
            .filter(|beta| beta.iter().all(|v| v.is_finite()))
    })
}

fn r_squared(observed: &DVector<f64>, fitted: &DVector<f64>) -> f64 {
    let mean = observed.mean();
    let ss_tot: f64 = observed.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = observed
        .iter()
        .zip(fitted.iter())
        .map(|(y, f)| (y - f).powi(2))
        .sum();
    if ss_tot == 0.0 {
        // Constant target: a perfect fit explains everything there is.
        if ss_res == 0.0 { 1.0 } else { 0.0 }
    } else {
        1.0 - ss_res / ss_tot
    }
}
