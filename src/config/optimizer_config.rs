//! Optimizer Configuration - search grid, safe limits and model inputs as TOML
//!
//! Every struct implements `Default` with the standard agronomic values, so
//! running without a config file gives the stock 270-candidate grid and the
//! 150/70/80 kg/ha safe limits.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::optimization::{SafeLimits, SafetyBands};
use crate::types::{DoseGrid, Nutrient};

use super::defaults::{CONFIG_ENV_VAR, DEFAULT_CONFIG_FILE, DEFAULT_DATASET_PATH};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for the optimizer.
///
/// Load with `OptimizerConfig::load()` which searches:
/// 1. `$FERTOPT_CONFIG` env var
/// 2. `./optimizer_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OptimizerConfig {
    /// Candidate dose domains
    #[serde(default)]
    pub grid: DoseGrid,

    /// Agronomic ceilings used for safety classification
    #[serde(default)]
    pub safe_limits: SafeLimits,

    /// Usage-ratio band edges
    #[serde(default)]
    pub safety_bands: SafetyBands,

    /// Yield model inputs
    #[serde(default)]
    pub model: ModelConfig,
}

/// Where the yield model gets its training data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// CSV with `Nitrogen,Phosphorus,Potassium,Soil_pH,Rainfall,Sunlight,Yield`
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATASET_PATH)
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dataset_path: default_dataset_path(),
        }
    }
}

impl OptimizerConfig {
    /// Load configuration using the standard search order:
    /// 1. `$FERTOPT_CONFIG` environment variable
    /// 2. `./optimizer_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded optimizer config from {CONFIG_ENV_VAR}");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {CONFIG_ENV_VAR}, falling back");
                    }
                }
            } else {
                warn!(path = %path, "{CONFIG_ENV_VAR} points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded optimizer config from ./{DEFAULT_CONFIG_FILE}");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{DEFAULT_CONFIG_FILE}, using defaults");
                }
            }
        }

        info!("No {DEFAULT_CONFIG_FILE} found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, err) => ConfigError::Parse(path.to_path_buf(), err),
            other => other,
        })
    }

    /// Parse and validate a TOML document. Unknown keys only warn.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Optimizer config saved");
        Ok(())
    }

    /// Validate for internal consistency.
    ///
    /// Rules:
    /// - Every nutrient range needs `step > 0`, `min > 0` and `min <= max`
    /// - Safe limits must be positive and finite
    /// - `0 < safe_max_ratio <= caution_max_ratio`
    /// - Dataset path must be set
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        for nutrient in Nutrient::ALL {
            let range = self.grid.range(nutrient);
            let name = nutrient.to_string().to_lowercase();
            if range.step == 0 {
                errors.push(format!("grid.{name}.step must be > 0"));
            }
            if range.min == 0 {
                errors.push(format!(
                    "grid.{name}.min must be > 0 (a zero dose is indistinguishable from no recommendation)"
                ));
            }
            if range.min > range.max {
                errors.push(format!(
                    "grid.{name}: min ({}) must be <= max ({})",
                    range.min, range.max
                ));
            }
        }

        let limits = [
            ("nitrogen", self.safe_limits.nitrogen),
            ("phosphorus", self.safe_limits.phosphorus),
            ("potassium", self.safe_limits.potassium),
        ];
        for (name, limit) in limits {
            if !limit.is_finite() || limit <= 0.0 {
                errors.push(format!("safe_limits.{name} must be a positive finite number (got {limit})"));
            }
        }

        let bands = &self.safety_bands;
        if !bands.safe_max_ratio.is_finite() || !bands.caution_max_ratio.is_finite() {
            errors.push(format!(
                "safety_bands: values must be finite (got safe={}, caution={})",
                bands.safe_max_ratio, bands.caution_max_ratio
            ));
        } else {
            if bands.safe_max_ratio <= 0.0 {
                errors.push("safety_bands.safe_max_ratio must be > 0".to_string());
            }
            if bands.caution_max_ratio < bands.safe_max_ratio {
                errors.push(format!(
                    "safety_bands.caution_max_ratio ({:.2}) must be >= safe_max_ratio ({:.2})",
                    bands.caution_max_ratio, bands.safe_max_ratio
                ));
            }
        }

        if self.model.dataset_path.as_os_str().is_empty() {
            errors.push("model.dataset_path must not be empty".to_string());
        }

        let (range_errors, range_warnings) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}
