//! Synthetic Yield Dataset Generator
//!
//! Writes a `Fertilizer_dataset.csv` with a plausible agronomic response so
//! the optimizer can be exercised without field data:
//! - Diminishing-returns (Mitscherlich) response to each of N, P and K
//! - Soil pH penalty away from neutral-acidic optimum (6.5)
//! - Rainfall and sunlight modifiers
//! - Gaussian measurement noise
//!
//! # Usage
//! ```bash
//! ./synth-dataset --rows 500 --seed 42 --output Fertilizer_dataset.csv
//! ./fertilizer-optimizer optimize --target 15 --soil-ph 6.5 --rainfall 150 --sunlight 7
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use rand::prelude::*;
use rand_distr::{Distribution, Normal, Uniform};
use std::path::PathBuf;
use tracing::info;

use fertilizer_optimizer::config::defaults::{
    DEFAULT_DATASET_PATH, TYPICAL_RAINFALL_MM, TYPICAL_SOIL_PH, TYPICAL_SUNLIGHT_HOURS,
};
use fertilizer_optimizer::predictor::{write_dataset, YieldRecord};

// ============================================================================
// Response Constants
// ============================================================================

/// Yield ceiling under unlimited nutrients and ideal weather (t/ha)
const MAX_YIELD: f64 = 32.0;
/// Mitscherlich half-saturation-like constants per nutrient (kg/ha)
const N_RESPONSE: f64 = 90.0;
const P_RESPONSE: f64 = 40.0;
const K_RESPONSE: f64 = 50.0;
/// Soil pH with no penalty
const OPTIMAL_PH: f64 = 6.5;

/// Sampled application ranges (kg/ha)
const NITROGEN_RANGE: (f64, f64) = (50.0, 200.0);
const PHOSPHORUS_RANGE: (f64, f64) = (20.0, 100.0);
const POTASSIUM_RANGE: (f64, f64) = (20.0, 120.0);

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "synth-dataset")]
#[command(about = "Synthetic crop yield dataset generator for fertilizer-optimizer")]
#[command(version)]
struct Args {
    /// Number of rows to generate
    #[arg(short, long, default_value = "500", value_parser = clap::value_parser!(u32).range(7..=1_000_000))]
    rows: u32,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Standard deviation of yield noise (t/ha)
    #[arg(long, default_value = "0.8")]
    noise: f64,

    /// Output CSV path
    #[arg(short, long, default_value = DEFAULT_DATASET_PATH)]
    output: PathBuf,
}

/// Noise-free yield response (t/ha).
fn response(n: f64, p: f64, k: f64, ph: f64, rainfall: f64, sunlight: f64) -> f64 {
    let nutrients = (1.0 - (-n / N_RESPONSE).exp())
        * (1.0 - (-p / P_RESPONSE).exp())
        * (1.0 - (-k / K_RESPONSE).exp());

    let ph_factor = (1.0 - 0.15 * (ph - OPTIMAL_PH).powi(2)).max(0.0);
    let rain_factor =
        0.7 + 0.3 * (rainfall / 200.0).min(1.0) - 0.1 * ((rainfall - 250.0).max(0.0) / 50.0);
    let sun_factor = 0.8 + 0.2 * ((sunlight - 4.0) / 6.0).clamp(0.0, 1.0);

    MAX_YIELD * nutrients * ph_factor * rain_factor * sun_factor
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let mut rng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let noise = Normal::new(0.0, args.noise.max(0.0)).context("Invalid noise standard deviation")?;

    let nitrogen = Uniform::new_inclusive(NITROGEN_RANGE.0, NITROGEN_RANGE.1);
    let phosphorus = Uniform::new_inclusive(PHOSPHORUS_RANGE.0, PHOSPHORUS_RANGE.1);
    let potassium = Uniform::new_inclusive(POTASSIUM_RANGE.0, POTASSIUM_RANGE.1);
    let soil_ph = Uniform::new_inclusive(TYPICAL_SOIL_PH.0, TYPICAL_SOIL_PH.1);
    let rainfall = Uniform::new_inclusive(TYPICAL_RAINFALL_MM.0, TYPICAL_RAINFALL_MM.1);
    let sunlight = Uniform::new_inclusive(TYPICAL_SUNLIGHT_HOURS.0, TYPICAL_SUNLIGHT_HOURS.1);

    let records: Vec<YieldRecord> = (0..args.rows)
        .map(|_| {
            let n = nitrogen.sample(&mut rng).round();
            let p = phosphorus.sample(&mut rng).round();
            let k = potassium.sample(&mut rng).round();
            let ph = (soil_ph.sample(&mut rng) * 10.0).round() / 10.0;
            let rain = rainfall.sample(&mut rng).round();
            let sun = (sunlight.sample(&mut rng) * 10.0).round() / 10.0;
            let y = response(n, p, k, ph, rain, sun) + noise.sample(&mut rng);
            YieldRecord {
                nitrogen: n,
                phosphorus: p,
                potassium: k,
                soil_ph: ph,
                rainfall: rain,
                sunlight: sun,
                yield_t_ha: (y.max(0.0) * 100.0).round() / 100.0,
            }
        })
        .collect();

    write_dataset(&args.output, &records)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!(
        rows = records.len(),
        path = %args.output.display(),
        seed = ?args.seed,
        "Synthetic yield dataset written"
    );
    Ok(())
}
