//! Optimization engine types for fertilizer dose recommendations

use serde::{Deserialize, Serialize};

use super::dose::Dose;
use super::field::EnvironmentContext;

/// Outcome of one exhaustive grid search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Lowest-yielding dose that still meets the target, `None` if no
    /// candidate reached it
    pub dose: Option<Dose>,
    /// Predicted yield of `dose` (t/ha). Sentinel `0.0` when `dose` is `None`.
    pub achieved_yield: f64,
    /// Number of predictor calls made
    pub candidates_evaluated: usize,
}

impl SearchResult {
    /// Result for a grid in which no candidate reached the target.
    pub const fn infeasible(candidates_evaluated: usize) -> Self {
        Self {
            dose: None,
            achieved_yield: 0.0,
            candidates_evaluated,
        }
    }

    pub const fn is_feasible(&self) -> bool {
        self.dose.is_some()
    }

    /// Achieved yield, only meaningful when a dose was found.
    pub fn achieved_yield(&self) -> Option<f64> {
        self.dose.map(|_| self.achieved_yield)
    }
}

/// Qualitative environmental risk band for a recommended dose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SafetyBand {
    /// Mean usage ratio at or below the safe limit
    Safe,
    /// Moderately above the safe limits
    Caution,
    /// Well beyond the safe limits
    Excessive,
}

impl std::fmt::Display for SafetyBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Safe => write!(f, "Safe"),
            Self::Caution => write!(f, "Caution"),
            Self::Excessive => write!(f, "Excessive"),
        }
    }
}

/// Per-nutrient dose / safe-limit ratios
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientRatios {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
}

/// Environmental safety classification of a dose
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyAssessment {
    /// Mean of the per-nutrient ratios
    pub usage_ratio: f64,
    pub ratios: NutrientRatios,
    pub band: SafetyBand,
}

/// Optimization request as received from the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    /// Target yield (t/ha)
    pub target_yield: f64,
    pub soil_ph: f64,
    /// Rainfall (mm)
    pub rainfall: f64,
    /// Sunlight (hours/day)
    pub sunlight: f64,
}

impl OptimizationRequest {
    pub const fn context(&self) -> EnvironmentContext {
        EnvironmentContext::new(self.soil_ph, self.rainfall, self.sunlight)
    }
}

/// Full optimization response handed back to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizationOutcome {
    pub target_yield: f64,
    /// Recommended dose, `None` when no grid point reaches the target
    pub recommended_dose: Option<Dose>,
    /// Predicted yield of the recommendation
    pub achieved_yield: Option<f64>,
    /// Safety classification of the recommendation
    pub safety: Option<SafetyAssessment>,
    pub candidates_evaluated: usize,
}

/// Coarse adjustment hint for a dose the user already applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdjustmentHint {
    /// Predicted yield already meets the target
    Sufficient,
    /// Predicted yield falls short of the target
    IncreaseNitrogenOrPotassium,
}

impl std::fmt::Display for AdjustmentHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sufficient => write!(f, "Current fertilizer levels are sufficient."),
            Self::IncreaseNitrogenOrPotassium => write!(
                f,
                "Increase Nitrogen or Potassium slightly to reach target yield."
            ),
        }
    }
}

/// Predicted yield of a given dose compared against a target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldCheck {
    pub dose: Dose,
    pub predicted_yield: f64,
    pub target_yield: f64,
    pub meets_target: bool,
    pub hint: AdjustmentHint,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infeasible_result_hides_sentinel_yield() {
        let r = SearchResult::infeasible(270);
        assert!(!r.is_feasible());
        assert_eq!(r.achieved_yield, 0.0);
        assert_eq!(r.achieved_yield(), None);
    }

    #[test]
    fn bands_order_from_loose_to_strict() {
        assert!(SafetyBand::Safe < SafetyBand::Caution);
        assert!(SafetyBand::Caution < SafetyBand::Excessive);
    }

    #[test]
    fn missing_dose_serializes_as_null() {
        let outcome = OptimizationOutcome {
            target_yield: 50.0,
            recommended_dose: None,
            achieved_yield: None,
            safety: None,
            candidates_evaluated: 270,
        };
        let json = serde_json::to_value(outcome).unwrap();
        assert!(json["recommended_dose"].is_null());
        assert!(json["achieved_yield"].is_null());
    }
}
