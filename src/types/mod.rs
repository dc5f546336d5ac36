//! Shared data structures for fertilizer optimization
//!
//! - `Dose`, `NutrientRange`, `DoseGrid`: candidate fertilizer levels and the search grid
//! - `EnvironmentContext`, `PredictionQuery`: soil/weather context and the predictor feature vector
//! - `SearchResult`, `SafetyAssessment`, `OptimizationOutcome`: optimizer outputs

mod dose;
mod field;
mod optimization;

pub use dose::*;
pub use field::*;
pub use optimization::*;
