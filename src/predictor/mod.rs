//! Yield Prediction
//!
//! The optimizer treats the yield model as an oracle: anything implementing
//! [`YieldPredictor`] can be searched against. The crate ships one backend,
//! an ordinary-least-squares model fitted on a CSV dataset.
//!
//! ## Modules
//! - `dataset`: CSV ingestion of `Nitrogen,Phosphorus,Potassium,Soil_pH,Rainfall,Sunlight,Yield`
//! - `linear`: least-squares regression backend
//! - `correlations`: per-feature Pearson correlation with p-values (statrs)

pub mod correlations;
pub mod dataset;
mod linear;

pub use correlations::{feature_correlations, FeatureCorrelation};
pub use dataset::{load_dataset, write_dataset, DatasetError, YieldRecord};
pub use linear::{FitError, FitReport, LinearYieldModel};

use thiserror::Error;

use crate::types::PredictionQuery;

/// Errors raised by a yield predictor. These propagate out of the search.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PredictorError {
    #[error("Predictor returned a non-finite yield: {value}")]
    NonFinite { value: f64 },
}

/// Yield oracle queried by the dose search.
///
/// Implementations must be pure with respect to the query: the same feature
/// vector always yields the same prediction. Stochastic models must be seeded.
pub trait YieldPredictor {
    /// Predicted yield (t/ha) for one feature vector.
    fn predict(&self, query: &PredictionQuery) -> Result<f64, PredictorError>;

    /// Short identifier for logs.
    fn name(&self) -> &str {
        "predictor"
    }
}

impl<P: YieldPredictor + ?Sized> YieldPredictor for &P {
    fn predict(&self, query: &PredictionQuery) -> Result<f64, PredictorError> {
        (**self).predict(query)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Adapts a plain response function into a [`YieldPredictor`].
pub struct FnPredictor<F> {
    name: String,
    func: F,
}

impl<F> FnPredictor<F>
where
    F: Fn(&PredictionQuery) -> f64,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> YieldPredictor for FnPredictor<F>
where
    F: Fn(&PredictionQuery) -> f64,
{
    fn predict(&self, query: &PredictionQuery) -> Result<f64, PredictorError> {
        let value = (self.func)(query);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(PredictorError::NonFinite { value })
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Dose, EnvironmentContext};

    fn query() -> PredictionQuery {
        PredictionQuery::new(Dose::new(100, 40, 60), EnvironmentContext::new(6.5, 150.0, 7.0))
    }

    #[test]
    fn fn_predictor_passes_through_value() {
        let p = FnPredictor::new("linear", |q: &PredictionQuery| f64::from(q.dose.nitrogen) / 10.0);
        assert_eq!(p.predict(&query()), Ok(10.0));
        assert_eq!(p.name(), "linear");
    }

    #[test]
    fn fn_predictor_rejects_nan() {
        let p = FnPredictor::new("broken", |_: &PredictionQuery| f64::NAN);
        assert!(matches!(p.predict(&query()), Err(PredictorError::NonFinite { .. })));
    }

    #[test]
    fn non_finite_error_reports_value() {
        let err = PredictorError::NonFinite { value: f64::INFINITY };
        assert_eq!(err.to_string(), "Predictor returned a non-finite yield: inf");
    }

    #[test]
    fn reference_forwards_to_inner_predictor() {
        let p = FnPredictor::new("const", |_: &PredictionQuery| 3.5);
        let by_ref: &dyn YieldPredictor = &p;
        assert_eq!((&by_ref).predict(&query()), Ok(3.5));
        assert_eq!((&by_ref).name(), "const");
    }
}
