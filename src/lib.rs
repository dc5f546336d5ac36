//! Fertilizer Optimizer: crop yield prediction and dose optimization
//!
//! Given a fitted yield model and a target yield, finds the N/P/K dose on a
//! fixed grid whose predicted yield meets the target with the least surplus,
//! and rates that dose against agronomic safe limits.
//!
//! ## Architecture
//!
//! - **Predictor**: `YieldPredictor` oracle seam plus a least-squares backend fitted on CSV data
//! - **Dose Search**: exhaustive grid search selecting the lowest eligible yield
//! - **Safety Classifier**: mean dose/safe-limit ratio mapped to Safe / Caution / Excessive
//! - **Advisor**: request validation, search, classification, batch execution

pub mod config;
pub mod optimization;
pub mod predictor;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, OptimizerConfig};

// Re-export commonly used types
pub use types::{
    AdjustmentHint, Dose, DoseGrid, EnvironmentContext, NutrientRange, OptimizationOutcome,
    OptimizationRequest, PredictionQuery, SafetyAssessment, SafetyBand, SearchResult, YieldCheck,
};

// Re-export the optimization engine
pub use optimization::{
    DoseSearchEngine, FertilizerAdvisor, OptimizationError, SafeLimits, SafetyBands,
    SafetyClassifier, SearchError,
};

// Re-export predictor components
pub use predictor::{FnPredictor, LinearYieldModel, PredictorError, YieldPredictor};
