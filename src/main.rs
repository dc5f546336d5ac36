//! Fertilizer Optimizer CLI
//!
//! Fits a yield model on a CSV dataset and recommends the N/P/K dose that
//! meets a target yield with the least surplus.
//!
//! # Usage
//!
//! ```bash
//! # Recommend a dose for a 15 t/ha target
//! fertilizer-optimizer optimize --target 15 --soil-ph 6.5 --rainfall 150 --sunlight 7
//!
//! # Check whether the current dose meets the target
//! fertilizer-optimizer check --nitrogen 120 --phosphorus 60 --potassium 60 \
//!     --soil-ph 6.5 --rainfall 150 --sunlight 7 --target 15
//!
//! # Inspect the fitted model
//! fertilizer-optimizer fit --json
//! ```
//!
//! # Environment Variables
//!
//! - `FERTOPT_CONFIG`: Path to optimizer config TOML (default: ./optimizer_config.toml)
//! - `FERTOPT_DATASET`: Path to the training CSV (overrides config)
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use fertilizer_optimizer::predictor::{load_dataset, FitReport};
use fertilizer_optimizer::{
    Dose, EnvironmentContext, FertilizerAdvisor, LinearYieldModel, OptimizationOutcome,
    OptimizationRequest, OptimizerConfig, SafeLimits, YieldCheck,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "fertilizer-optimizer")]
#[command(about = "Crop yield prediction and fertilizer dose optimization")]
#[command(version)]
struct CliArgs {
    /// Optimizer config TOML (default: $FERTOPT_CONFIG, then ./optimizer_config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Training dataset CSV (overrides model.dataset_path)
    #[arg(long, global = true, env = "FERTOPT_DATASET")]
    dataset: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Find the minimal-surplus dose that meets a target yield
    Optimize {
        /// Target yield (t/ha)
        #[arg(long)]
        target: f64,
        #[command(flatten)]
        field: FieldArgs,
    },

    /// Predict the yield of a given dose and compare it with a target
    Check {
        /// Nitrogen (kg/ha)
        #[arg(long)]
        nitrogen: u32,
        /// Phosphorus (kg/ha)
        #[arg(long)]
        phosphorus: u32,
        /// Potassium (kg/ha)
        #[arg(long)]
        potassium: u32,
        /// Target yield (t/ha)
        #[arg(long)]
        target: f64,
        #[command(flatten)]
        field: FieldArgs,
    },

    /// Fit the yield model and print its report
    Fit,

    /// Print the effective configuration as TOML
    Config,
}

#[derive(clap::Args, Debug)]
struct FieldArgs {
    /// Soil pH
    #[arg(long)]
    soil_ph: f64,
    /// Rainfall (mm)
    #[arg(long)]
    rainfall: f64,
    /// Sunlight (hours/day)
    #[arg(long)]
    sunlight: f64,
}

impl FieldArgs {
    const fn context(&self) -> EnvironmentContext {
        EnvironmentContext::new(self.soil_ph, self.rainfall, self.sunlight)
    }
}

// ============================================================================
// Setup
// ============================================================================

fn load_config(path: Option<&PathBuf>) -> Result<OptimizerConfig> {
    match path {
        Some(p) => OptimizerConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config {}", p.display())),
        None => Ok(OptimizerConfig::load()),
    }
}

fn fit_model(config: &OptimizerConfig, dataset: Option<&PathBuf>) -> Result<LinearYieldModel> {
    let path = dataset.unwrap_or(&config.model.dataset_path);
    let records = load_dataset(path)
        .with_context(|| format!("Failed to load training data from {}", path.display()))?;
    LinearYieldModel::fit(&records).context("Failed to fit yield model")
}

// ============================================================================
// Output
// ============================================================================

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

fn print_outcome(outcome: &OptimizationOutcome, limits: &SafeLimits) {
    println!("Target yield: {:.2} tons/ha", outcome.target_yield);
    println!("Candidates evaluated: {}", outcome.candidates_evaluated);
    match (outcome.recommended_dose, outcome.achieved_yield) {
        (Some(dose), Some(achieved)) => {
            println!("Recommended dose: {dose}");
            println!("Predicted yield: {achieved:.2} tons/ha");
            if let Some(safety) = outcome.safety {
                println!(
                    "Environmental safety: {} (usage ratio {:.2}; N {:.2}, P {:.2}, K {:.2})",
                    safety.band,
                    safety.usage_ratio,
                    safety.ratios.nitrogen,
                    safety.ratios.phosphorus,
                    safety.ratios.potassium
                );
                println!(
                    "Safe limits: N {:.0}, P {:.0}, K {:.0} kg/ha",
                    limits.nitrogen, limits.phosphorus, limits.potassium
                );
            }
        }
        _ => println!("No fertilizer combination reaches the target yield."),
    }
}

fn print_check(check: &YieldCheck) {
    println!("Dose: {}", check.dose);
    if check.meets_target {
        println!("Predicted yield: {:.2} tons/ha (meets target {:.2})", check.predicted_yield, check.target_yield);
    } else {
        println!("Predicted yield: {:.2} tons/ha (below target {:.2})", check.predicted_yield, check.target_yield);
    }
    println!("{}", check.hint);
}

fn print_report(report: &FitReport) {
    println!("Rows: {}", report.rows);
    println!("R²: {:.4}", report.r_squared);
    println!("Intercept: {:.4}", report.intercept);
    for (name, coef) in &report.coefficients {
        println!("  {name:<10} {coef:>10.5}");
    }
    println!("Feature correlations with yield:");
    for c in &report.correlations {
        println!(
            "  {:<10} r={:>6.3} p={:.4}{}",
            c.feature,
            c.r_value,
            c.p_value,
            if c.significant { " *" } else { "" }
        );
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = load_config(args.config.as_ref())?;

    match args.command {
        SubCommand::Config => {
            print!("{}", config.to_toml().context("Failed to render config")?);
        }
        SubCommand::Fit => {
            let model = fit_model(&config, args.dataset.as_ref())?;
            let report = model.report();
            if args.json {
                print_json(&report)?;
            } else {
                print_report(&report);
            }
        }
        SubCommand::Optimize { target, field } => {
            let model = fit_model(&config, args.dataset.as_ref())?;
            let advisor = FertilizerAdvisor::from_config(&config);
            let request = OptimizationRequest {
                target_yield: target,
                soil_ph: field.soil_ph,
                rainfall: field.rainfall,
                sunlight: field.sunlight,
            };
            info!(
                target,
                candidates = advisor.engine().grid().candidate_count(),
                "Searching dose grid"
            );
            let outcome = advisor.optimize(&request, &model)?;
            if args.json {
                print_json(&outcome)?;
            } else {
                print_outcome(&outcome, advisor.classifier().limits());
            }
        }
        SubCommand::Check {
            nitrogen,
            phosphorus,
            potassium,
            target,
            field,
        } => {
            let model = fit_model(&config, args.dataset.as_ref())?;
            let advisor = FertilizerAdvisor::from_config(&config);
            let dose = Dose::new(nitrogen, phosphorus, potassium);
            let check = advisor.check_dose(&dose, &field.context(), target, &model)?;
            if args.json {
                print_json(&check)?;
            } else {
                print_check(&check);
            }
        }
    }

    Ok(())
}
