//! Environmental safety classification of a dose

use serde::{Deserialize, Serialize};

use crate::types::{Dose, NutrientRatios, SafetyAssessment, SafetyBand};

/// Absolute tolerance on band edges, so decimal ratios such as 1.3 land on
/// the inclusive side of the boundary after floating-point averaging.
const BAND_EPSILON: f64 = 1e-9;

/// Agronomic per-nutrient ceilings (kg/ha), independent of the search grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafeLimits {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
}

impl Default for SafeLimits {
    fn default() -> Self {
        Self {
            nitrogen: 150.0,
            phosphorus: 70.0,
            potassium: 80.0,
        }
    }
}

/// Upper edges (inclusive) of the Safe and Caution bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyBands {
    pub safe_max_ratio: f64,
    pub caution_max_ratio: f64,
}

impl Default for SafetyBands {
    fn default() -> Self {
        Self {
            safe_max_ratio: 1.0,
            caution_max_ratio: 1.3,
        }
    }
}

impl SafetyBands {
    /// Upper edges are inclusive: a ratio equal to `safe_max_ratio` is Safe and
    /// one equal to `caution_max_ratio` (1.3 by default) is Caution.
    pub fn band_for(&self, usage_ratio: f64) -> SafetyBand {
        if usage_ratio <= self.safe_max_ratio + BAND_EPSILON {
            SafetyBand::Safe
        } else if usage_ratio <= self.caution_max_ratio + BAND_EPSILON {
            SafetyBand::Caution
        } else {
            SafetyBand::Excessive
        }
    }
}

/// Maps a dose to its mean usage ratio against the safe limits and a risk band.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyClassifier {
    limits: SafeLimits,
    bands: SafetyBands,
}

impl SafetyClassifier {
    pub const fn new(limits: SafeLimits, bands: SafetyBands) -> Self {
        Self { limits, bands }
    }

    pub const fn limits(&self) -> &SafeLimits {
        &self.limits
    }

    pub fn classify(&self, dose: &Dose) -> SafetyAssessment {
        let ratios = NutrientRatios {
            nitrogen: f64::from(dose.nitrogen) / self.limits.nitrogen,
            phosphorus: f64::from(dose.phosphorus) / self.limits.phosphorus,
            potassium: f64::from(dose.potassium) / self.limits.potassium,
        };
        let usage_ratio = (ratios.nitrogen + ratios.phosphorus + ratios.potassium) / 3.0;

        SafetyAssessment {
            usage_ratio,
            ratios,
            band: self.bands.band_for(usage_ratio),
        }
    }
}
