//! Fertilizer dose types and the discrete dose grid

use serde::{Deserialize, Serialize};

/// Nutrients that make up a fertilizer dose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    /// Nitrogen (kg/ha)
    Nitrogen,
    /// Phosphorus (kg/ha)
    Phosphorus,
    /// Potassium (kg/ha)
    Potassium,
}

impl Nutrient {
    /// All nutrients in grid enumeration order (N, P, K).
    pub const ALL: [Nutrient; 3] = [Nutrient::Nitrogen, Nutrient::Phosphorus, Nutrient::Potassium];
}

impl std::fmt::Display for Nutrient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Nutrient::Nitrogen => write!(f, "Nitrogen"),
            Nutrient::Phosphorus => write!(f, "Phosphorus"),
            Nutrient::Potassium => write!(f, "Potassium"),
        }
    }
}

/// A candidate fertilizer application, one integer level per nutrient (kg/ha)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dose {
    pub nitrogen: u32,
    pub phosphorus: u32,
    pub potassium: u32,
}

impl Dose {
    pub const fn new(nitrogen: u32, phosphorus: u32, potassium: u32) -> Self {
        Self {
            nitrogen,
            phosphorus,
            potassium,
        }
    }

    /// Total nutrient mass across N, P and K (kg/ha).
    pub const fn total(&self) -> u32 {
        self.nitrogen + self.phosphorus + self.potassium
    }
}

impl std::fmt::Display for Dose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "N={} P={} K={} kg/ha",
            self.nitrogen, self.phosphorus, self.potassium
        )
    }
}

/// Bounded integer domain for one nutrient: `min`, `min + step`, ... up to
/// and including `max`.
///
/// When `step` does not land exactly on `max`, the upper bound is still
/// emitted as the final value, so the grid always covers its ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutrientRange {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl NutrientRange {
    pub const fn new(min: u32, max: u32, step: u32) -> Self {
        Self { min, max, step }
    }

    /// Whether the range can be enumerated (non-zero step, ordered bounds).
    pub const fn is_valid(&self) -> bool {
        self.step > 0 && self.min <= self.max
    }

    /// Ascending candidate values. Empty for an invalid range.
    pub fn values(&self) -> Vec<u32> {
        if !self.is_valid() {
            return Vec::new();
        }
        let mut values: Vec<u32> = (self.min..self.max).step_by(self.step as usize).collect();
        values.push(self.max);
        values
    }

    /// Number of candidate values in this domain.
    pub fn len(&self) -> usize {
        if !self.is_valid() {
            return 0;
        }
        let span = self.max - self.min;
        // Values strictly below max, plus max itself.
        span.div_ceil(self.step) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cartesian dose grid searched by the optimizer
///
/// Deserializes field by field over the defaults, so `[grid.nitrogen]` with
/// only `step = 10` keeps the stock nitrogen bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GridOverrides")]
pub struct DoseGrid {
    pub nitrogen: NutrientRange,
    pub phosphorus: NutrientRange,
    pub potassium: NutrientRange,
}

/// Partial `[grid.<nutrient>]` table as written in config files
#[derive(Debug, Default, Deserialize)]
struct RangeOverride {
    min: Option<u32>,
    max: Option<u32>,
    step: Option<u32>,
}

impl RangeOverride {
    fn apply(self, base: NutrientRange) -> NutrientRange {
        NutrientRange {
            min: self.min.unwrap_or(base.min),
            max: self.max.unwrap_or(base.max),
            step: self.step.unwrap_or(base.step),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GridOverrides {
    nitrogen: RangeOverride,
    phosphorus: RangeOverride,
    potassium: RangeOverride,
}

impl From<GridOverrides> for DoseGrid {
    fn from(overrides: GridOverrides) -> Self {
        let base = Self::default();
        Self {
            nitrogen: overrides.nitrogen.apply(base.nitrogen),
            phosphorus: overrides.phosphorus.apply(base.phosphorus),
            potassium: overrides.potassium.apply(base.potassium),
        }
    }
}

impl Default for DoseGrid {
    fn default() -> Self {
        Self {
            nitrogen: NutrientRange::new(50, 200, 20),
            phosphorus: NutrientRange::new(20, 100, 20),
            potassium: NutrientRange::new(20, 120, 20),
        }
    }
}

impl DoseGrid {
    /// Domain for a single nutrient.
    pub const fn range(&self, nutrient: Nutrient) -> &NutrientRange {
        match nutrient {
            Nutrient::Nitrogen => &self.nitrogen,
            Nutrient::Phosphorus => &self.phosphorus,
            Nutrient::Potassium => &self.potassium,
        }
    }

    /// `|N| × |P| × |K|`.
    pub fn candidate_count(&self) -> usize {
        self.nitrogen.len() * self.phosphorus.len() * self.potassium.len()
    }

    /// All candidate doses, nitrogen-outer, phosphorus-middle, potassium-inner,
    /// ascending in each dimension.
    pub fn candidates(&self) -> impl Iterator<Item = Dose> {
        let phosphorus = self.phosphorus.values();
        let potassium = self.potassium.values();
        self.nitrogen.values().into_iter().flat_map(move |n| {
            let potassium = potassium.clone();
            phosphorus.clone().into_iter().flat_map(move |p| {
                potassium
                    .clone()
                    .into_iter()
                    .map(move |k| Dose::new(n, p, k))
            })
        })
    }
}
