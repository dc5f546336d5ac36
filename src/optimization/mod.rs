//! Fertilizer Dose Optimization Engine
//!
//! Searches a fixed N/P/K grid for the dose whose predicted yield meets a
//! target with the smallest surplus, then rates that dose against agronomic
//! safe limits. Entirely algorithmic; the yield model is an injected oracle.

mod advisor;
mod safety;
mod search;

pub use advisor::{FertilizerAdvisor, OptimizationError};
pub use safety::{SafeLimits, SafetyBands, SafetyClassifier};
pub use search::{DoseSearchEngine, SearchError};
