//! Optimizer Configuration Module
//!
//! Search grid, safe limits and model inputs loaded from TOML, with
//! built-in defaults matching the standard agronomic values.
//!
//! ## Loading Order
//!
//! 1. `FERTOPT_CONFIG` environment variable (path to TOML file)
//! 2. `optimizer_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! The loaded config is passed explicitly to whatever needs it:
//!
//! ```ignore
//! let config = OptimizerConfig::load();
//! let advisor = FertilizerAdvisor::from_config(&config);
//! ```

pub mod defaults;
mod optimizer_config;
pub mod validation;

pub use optimizer_config::*;
