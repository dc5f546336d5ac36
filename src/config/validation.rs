//! Config validation: unknown-key detection with Levenshtein suggestions
//! and physical range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

use crate::types::Nutrient;

use super::defaults::{
    MAX_RECOMMENDED_CANDIDATES, PHYSICAL_MAX_APPLICATION_KG_HA, TYPICAL_MAX_APPLICATION_KG_HA,
};

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for `OptimizerConfig`.
///
/// Maintained by hand to match the struct hierarchy in optimizer_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [grid]
        "grid",
        "grid.nitrogen",
        "grid.nitrogen.min",
        "grid.nitrogen.max",
        "grid.nitrogen.step",
        "grid.phosphorus",
        "grid.phosphorus.min",
        "grid.phosphorus.max",
        "grid.phosphorus.step",
        "grid.potassium",
        "grid.potassium.min",
        "grid.potassium.max",
        "grid.potassium.step",
        // [safe_limits]
        "safe_limits",
        "safe_limits.nitrogen",
        "safe_limits.phosphorus",
        "safe_limits.potassium",
        // [safety_bands]
        "safety_bands",
        "safety_bands.safe_max_ratio",
        "safety_bands.caution_max_ratio",
        // [model]
        "model",
        "model.dataset_path",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Levenshtein edit distance between two strings, counted in chars.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let b_len = b_chars.len();
    if a.is_empty() {
        return b_len;
    }
    if b_len == 0 {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
///
/// Ties resolve to the alphabetically first key so suggestions are stable.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    let mut candidates: Vec<&str> = known.iter().copied().collect();
    candidates.sort_unstable();
    candidates
        .into_iter()
        .map(|k| (k, levenshtein(unknown, k)))
        .filter(|(_, dist)| *dist <= 3)
        .min_by_key(|(_, dist)| *dist)
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys, it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Physical Range Validation
// ============================================================================

/// Validate physical ranges on a parsed `OptimizerConfig`.
///
/// Returns (errors, warnings): errors are impossible values that must
/// prevent startup; warnings are suspicious but not fatal.
pub fn validate_physical_ranges(
    config: &super::OptimizerConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for nutrient in Nutrient::ALL {
        let range = config.grid.range(nutrient);
        let name = nutrient.to_string().to_lowercase();

        if range.max > PHYSICAL_MAX_APPLICATION_KG_HA {
            errors.push(format!(
                "grid.{name}.max = {} kg/ha is outside physical range (0-{PHYSICAL_MAX_APPLICATION_KG_HA} kg/ha)",
                range.max
            ));
        } else if range.max > TYPICAL_MAX_APPLICATION_KG_HA {
            warnings.push(ValidationWarning {
                field: format!("grid.{name}.max"),
                message: format!(
                    "grid.{name}.max = {} kg/ha is above typical application rates (<= {TYPICAL_MAX_APPLICATION_KG_HA} kg/ha)",
                    range.max
                ),
                suggestion: None,
            });
        }
    }

    let candidates = config.grid.candidate_count();
    if candidates > MAX_RECOMMENDED_CANDIDATES {
        warnings.push(ValidationWarning {
            field: "grid".to_string(),
            message: format!(
                "grid has {candidates} candidates (> {MAX_RECOMMENDED_CANDIDATES}); every candidate is one model call"
            ),
            suggestion: None,
        });
    }

    let limits = &config.safe_limits;
    for (name, limit) in [
        ("nitrogen", limits.nitrogen),
        ("phosphorus", limits.phosphorus),
        ("potassium", limits.potassium),
    ] {
        if limit.is_finite() && limit > f64::from(PHYSICAL_MAX_APPLICATION_KG_HA) {
            errors.push(format!(
                "safe_limits.{name} = {limit:.1} kg/ha is outside physical range (0-{PHYSICAL_MAX_APPLICATION_KG_HA} kg/ha)"
            ));
        }
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
