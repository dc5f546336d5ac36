//! Field context and the predictor feature vector

use serde::{Deserialize, Serialize};

use super::dose::Dose;

/// Feature names in the canonical column order used by datasets and models.
pub const FEATURE_NAMES: [&str; 6] = [
    "Nitrogen",
    "Phosphorus",
    "Potassium",
    "Soil_pH",
    "Rainfall",
    "Sunlight",
];

/// Number of predictor input features.
pub const NUM_FEATURES: usize = FEATURE_NAMES.len();

/// Soil and weather conditions, fixed for one optimization run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentContext {
    /// Soil pH
    pub soil_ph: f64,
    /// Seasonal rainfall (mm)
    pub rainfall: f64,
    /// Sunlight (hours/day)
    pub sunlight: f64,
}

impl EnvironmentContext {
    pub const fn new(soil_ph: f64, rainfall: f64, sunlight: f64) -> Self {
        Self {
            soil_ph,
            rainfall,
            sunlight,
        }
    }

    /// First non-finite field, if any.
    pub fn non_finite_field(&self) -> Option<(&'static str, f64)> {
        [
            ("soil_ph", self.soil_ph),
            ("rainfall", self.rainfall),
            ("sunlight", self.sunlight),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
    }
}

/// Full feature vector handed to a yield predictor: a dose plus its field context
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionQuery {
    pub dose: Dose,
    pub context: EnvironmentContext,
}

impl PredictionQuery {
    pub const fn new(dose: Dose, context: EnvironmentContext) -> Self {
        Self { dose, context }
    }

    /// Features in `FEATURE_NAMES` order.
    pub fn features(&self) -> [f64; NUM_FEATURES] {
        [
            f64::from(self.dose.nitrogen),
            f64::from(self.dose.phosphorus),
            f64::from(self.dose.potassium),
            self.context.soil_ph,
            self.context.rainfall,
            self.context.sunlight,
        ]
    }

    /// Look up a feature by its column name.
    pub fn feature(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.features()[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn features_follow_column_order() {
        let q = PredictionQuery::new(Dose::new(120, 60, 40), EnvironmentContext::new(6.5, 150.0, 7.0));
        assert_eq!(q.features(), [120.0, 60.0, 40.0, 6.5, 150.0, 7.0]);
        assert_eq!(q.feature("Soil_pH"), Some(6.5));
        assert_eq!(q.feature("Potassium"), Some(40.0));
        assert_eq!(q.feature("Humidity"), None);
    }

    #[test]
    fn detects_non_finite_context() {
        assert!(EnvironmentContext::new(6.5, 150.0, 7.0).non_finite_field().is_none());
        let bad = EnvironmentContext::new(6.5, f64::NAN, 7.0);
        assert_eq!(bad.non_finite_field().map(|(name, _)| name), Some("rainfall"));
    }
}
