//! Request-level entry point: validate, search, classify

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

use super::safety::SafetyClassifier;
use super::search::{DoseSearchEngine, SearchError};
use crate::config::{defaults, OptimizerConfig};
use crate::predictor::{PredictorError, YieldPredictor};
use crate::types::{
    AdjustmentHint, Dose, EnvironmentContext, OptimizationOutcome, OptimizationRequest,
    PredictionQuery, YieldCheck,
};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OptimizationError {
    #[error("Target yield must be a positive finite number, got {0}")]
    InvalidTarget(f64),

    #[error("Field context value {field} must be finite, got {value}")]
    InvalidContext { field: &'static str, value: f64 },

    #[error("Yield predictor failed: {0}")]
    Predictor(#[from] PredictorError),
}

impl From<SearchError> for OptimizationError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidTarget(target) => Self::InvalidTarget(target),
            SearchError::Predictor(e) => Self::Predictor(e),
        }
    }
}

/// Combines the dose search and the safety classifier behind the request
/// interface used by the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct FertilizerAdvisor {
    engine: DoseSearchEngine,
    classifier: SafetyClassifier,
}

impl FertilizerAdvisor {
    pub const fn new(engine: DoseSearchEngine, classifier: SafetyClassifier) -> Self {
        Self { engine, classifier }
    }

    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self::new(
            DoseSearchEngine::new(config.grid),
            SafetyClassifier::new(config.safe_limits, config.safety_bands),
        )
    }

    pub const fn engine(&self) -> &DoseSearchEngine {
        &self.engine
    }

    pub const fn classifier(&self) -> &SafetyClassifier {
        &self.classifier
    }

    /// Find the minimal-surplus dose for one request and classify it.
    ///
    /// An unreachable target is a normal outcome with every optional field
    /// empty, not an error.
    pub fn optimize<P>(
        &self,
        request: &OptimizationRequest,
        predictor: &P,
    ) -> Result<OptimizationOutcome, OptimizationError>
    where
        P: YieldPredictor + ?Sized,
    {
        validate_target(request.target_yield)?;
        let context = request.context();
        validate_context(&context)?;
        warn_unusual_inputs(request.target_yield, &context);

        let result = self.engine.search(request.target_yield, &context, predictor)?;
        let safety = result.dose.map(|dose| self.classifier.classify(&dose));

        Ok(OptimizationOutcome {
            target_yield: request.target_yield,
            recommended_dose: result.dose,
            achieved_yield: result.achieved_yield(),
            safety,
            candidates_evaluated: result.candidates_evaluated,
        })
    }

    /// Run independent requests in parallel. Each search stays sequential;
    /// results come back in request order.
    pub fn optimize_batch<P>(
        &self,
        requests: &[OptimizationRequest],
        predictor: &P,
    ) -> Vec<Result<OptimizationOutcome, OptimizationError>>
    where
        P: YieldPredictor + Sync + ?Sized,
    {
        debug!(requests = requests.len(), "Running batch optimization");
        requests
            .par_iter()
            .map(|request| self.optimize(request, predictor))
            .collect()
    }

    /// Predict the yield of a dose the user already applies and compare it
    /// with the target.
    pub fn check_dose<P>(
        &self,
        dose: &Dose,
        context: &EnvironmentContext,
        target: f64,
        predictor: &P,
    ) -> Result<YieldCheck, OptimizationError>
    where
        P: YieldPredictor + ?Sized,
    {
        validate_target(target)?;
        validate_context(context)?;
        warn_unusual_inputs(target, context);

        let predicted_yield = predictor.predict(&PredictionQuery::new(*dose, *context))?;
        if !predicted_yield.is_finite() {
            return Err(PredictorError::NonFinite {
                value: predicted_yield,
            }
            .into());
        }
        let meets_target = predicted_yield >= target;
        let hint = if meets_target {
            AdjustmentHint::Sufficient
        } else {
            AdjustmentHint::IncreaseNitrogenOrPotassium
        };

        Ok(YieldCheck {
            dose: *dose,
            predicted_yield,
            target_yield: target,
            meets_target,
            hint,
        })
    }
}

fn validate_target(target: f64) -> Result<(), OptimizationError> {
    if target.is_finite() && target > 0.0 {
        Ok(())
    } else {
        Err(OptimizationError::InvalidTarget(target))
    }
}

fn validate_context(context: &EnvironmentContext) -> Result<(), OptimizationError> {
    match context.non_finite_field() {
        Some((field, value)) => Err(OptimizationError::InvalidContext { field, value }),
        None => Ok(()),
    }
}

/// Values outside the ranges the model was built for are allowed but logged.
fn warn_unusual_inputs(target: f64, context: &EnvironmentContext) {
    let checks = [
        ("target_yield", target, defaults::TYPICAL_TARGET_YIELD),
        ("soil_ph", context.soil_ph, defaults::TYPICAL_SOIL_PH),
        ("rainfall", context.rainfall, defaults::TYPICAL_RAINFALL_MM),
        ("sunlight", context.sunlight, defaults::TYPICAL_SUNLIGHT_HOURS),
    ];
    for (field, value, (lo, hi)) in checks {
        if value < lo || value > hi {
            warn!(field, value, min = lo, max = hi, "Input outside typical field range");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::FnPredictor;
    use crate::types::SafetyBand;

    fn request(target: f64) -> OptimizationRequest {
        OptimizationRequest {
            target_yield: target,
            soil_ph: 6.5,
            rainfall: 150.0,
            sunlight: 7.0,
        }
    }

    fn npk_sum() -> FnPredictor<impl Fn(&PredictionQuery) -> f64> {
        FnPredictor::new("npk-sum", |q: &PredictionQuery| f64::from(q.dose.total()) / 20.0)
    }

    #[test]
    fn outcome_carries_dose_and_safety() {
        let advisor = FertilizerAdvisor::default();
        let outcome = advisor.optimize(&request(5.0), &npk_sum()).unwrap();
        // Smallest total reaching 100 kg/ha is N=50 P=20 K=40 (first enumerated).
        assert_eq!(outcome.recommended_dose, Some(Dose::new(50, 20, 40)));
        assert_eq!(outcome.achieved_yield, Some(5.5));
        let safety = outcome.safety.unwrap();
        assert_eq!(safety.band, SafetyBand::Safe);
        assert_eq!(outcome.candidates_evaluated, 270);
    }

    #[test]
    fn infeasible_outcome_has_no_yield_or_safety() {
        let advisor = FertilizerAdvisor::default();
        let outcome = advisor.optimize(&request(10_000.0), &npk_sum()).unwrap();
        assert!(outcome.recommended_dose.is_none());
        assert!(outcome.achieved_yield.is_none());
        assert!(outcome.safety.is_none());
    }

    #[test]
    fn rejects_non_positive_target() {
        let advisor = FertilizerAdvisor::default();
        assert_eq!(
            advisor.optimize(&request(0.0), &npk_sum()).unwrap_err(),
            OptimizationError::InvalidTarget(0.0)
        );
        assert!(matches!(
            advisor.optimize(&request(f64::NAN), &npk_sum()),
            Err(OptimizationError::InvalidTarget(_))
        ));
    }

    #[test]
    fn rejects_non_finite_context() {
        let advisor = FertilizerAdvisor::default();
        let mut req = request(5.0);
        req.sunlight = f64::INFINITY;
        assert!(matches!(
            advisor.optimize(&req, &npk_sum()),
            Err(OptimizationError::InvalidContext { field: "sunlight", .. })
        ));
    }

    #[test]
    fn predictor_error_is_wrapped() {
        let advisor = FertilizerAdvisor::default();
        let broken = FnPredictor::new("broken", |_: &PredictionQuery| f64::NAN);
        assert!(matches!(
            advisor.optimize(&request(5.0), &broken),
            Err(OptimizationError::Predictor(PredictorError::NonFinite { .. }))
        ));
    }

    #[test]
    fn batch_preserves_request_order() {
        let advisor = FertilizerAdvisor::default();
        let requests: Vec<_> = [5.0, 10_000.0, 12.0, -1.0].into_iter().map(request).collect();
        let results = advisor.optimize_batch(&requests, &npk_sum());
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap().achieved_yield, Some(5.5));
        assert!(results[1].as_ref().unwrap().recommended_dose.is_none());
        assert_eq!(results[2].as_ref().unwrap().achieved_yield, Some(12.0));
        assert!(results[3].is_err());
    }

    #[test]
    fn check_dose_reports_shortfall_hint() {
        let advisor = FertilizerAdvisor::default();
        let ctx = EnvironmentContext::new(6.5, 150.0, 7.0);
        let dose = Dose::new(120, 60, 60);

        let short = advisor.check_dose(&dose, &ctx, 15.0, &npk_sum()).unwrap();
        assert_eq!(short.predicted_yield, 12.0);
        assert!(!short.meets_target);
        assert_eq!(short.hint, AdjustmentHint::IncreaseNitrogenOrPotassium);

        let met = advisor.check_dose(&dose, &ctx, 12.0, &npk_sum()).unwrap();
        assert!(met.meets_target);
        assert_eq!(met.hint, AdjustmentHint::Sufficient);
    }
}
