//! System-wide default constants.
//!
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Config Loading
// ============================================================================

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "FERTOPT_CONFIG";

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "optimizer_config.toml";

/// Training dataset looked up in the working directory.
pub const DEFAULT_DATASET_PATH: &str = "Fertilizer_dataset.csv";

// ============================================================================
// Grid Sanity
// ============================================================================

/// Grids above this many candidates trigger a latency warning.
///
/// Each candidate is one predictor call; the stock grid is 270.
pub const MAX_RECOMMENDED_CANDIDATES: usize = 100_000;

/// Per-nutrient application rate considered unusual (kg/ha).
pub const TYPICAL_MAX_APPLICATION_KG_HA: u32 = 400;

/// Per-nutrient application rate that cannot be a real field dose (kg/ha).
pub const PHYSICAL_MAX_APPLICATION_KG_HA: u32 = 2_000;

// ============================================================================
// Field Inputs
// ============================================================================
//
// Ranges the bundled dataset covers. Requests outside them still run but
// are logged, since a regression model extrapolates poorly.

/// Soil pH (min, max).
pub const TYPICAL_SOIL_PH: (f64, f64) = (5.5, 7.5);

/// Rainfall in mm (min, max).
pub const TYPICAL_RAINFALL_MM: (f64, f64) = (50.0, 300.0);

/// Sunlight in hours/day (min, max).
pub const TYPICAL_SUNLIGHT_HOURS: (f64, f64) = (4.0, 10.0);

/// Target yield in t/ha (min, max).
pub const TYPICAL_TARGET_YIELD: (f64, f64) = (5.0, 30.0);
