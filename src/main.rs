use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use airsense_data::{ReadingsReader, SensorReading};
use airsense_model::{AirQualityModel, Assessment, TierRow, TrainingConfig, train};
use airsense_tree::PersistentModel;

#[derive(Parser)]
#[command(name = "airsense")]
#[command(about = "Air-quality tier classification and problem-sensor diagnosis")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Train both models on synthetic data and save the bundle
    Train {
        /// Where to write the trained bundle
        #[arg(long)]
        output: PathBuf,

        /// Maximum depth of the quality tree
        #[arg(long, default_value_t = 15)]
        max_depth: usize,

        /// Minimum samples required to split a quality-tree node
        #[arg(long, default_value_t = 5)]
        min_samples_split: usize,

        /// Fraction of samples held out for evaluation
        #[arg(long, default_value_t = 0.2)]
        test_fraction: f64,
    },

    /// Assess a single reading
    Predict {
        /// Path to a trained bundle
        #[arg(long)]
        model: PathBuf,

        /// CO2 concentration (ppm)
        #[arg(long)]
        co2: f64,

        /// CO concentration (ppm)
        #[arg(long)]
        co: f64,

        /// PM2.5 concentration (μg/m³)
        #[arg(long)]
        pm25: f64,

        /// Temperature (°C)
        #[arg(long)]
        temperature: f64,

        /// Relative humidity (%)
        #[arg(long)]
        humidity: f64,
    },

    /// Assess every reading in a CSV file
    Batch {
        /// Path to a trained bundle
        #[arg(long)]
        model: PathBuf,

        /// CSV with co2, co, pm25, temperature and humidity columns
        #[arg(long)]
        input: PathBuf,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct TrainOutput {
    model: PathBuf,
    n_train: usize,
    n_test: usize,
    quality_accuracy: f64,
    diagnostics_accuracy: f64,
    quality_nodes: usize,
    quality_depth: usize,
    tiers: Vec<TierRow>,
}

#[derive(Serialize)]
struct BatchOutput {
    n_readings: usize,
    n_flagged: usize,
    assessments: Vec<Assessment>,
}

fn load_model(path: &Path) -> Result<AirQualityModel> {
    let model = AirQualityModel::load(path)
        .with_context(|| format!("failed to load model from {}", path.display()))?;
    info!(
        path = %path.display(),
        quality_nodes = model.quality().n_nodes(),
        flag_columns = model.diagnostics().n_labels(),
        "model loaded"
    );
    Ok(model)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Train {
            output,
            max_depth,
            min_samples_split,
            test_fraction,
        } => {
            let config = TrainingConfig::new()
                .with_seed(cli.seed)
                .with_test_fraction(test_fraction)
                .with_quality_max_depth(max_depth)
                .with_quality_min_samples_split(min_samples_split);

            let report = train(&config).context("training failed")?;
            report
                .model
                .save(&output)
                .with_context(|| format!("failed to save model to {}", output.display()))?;
            info!(path = %output.display(), "model saved");

            let quality = report.model.quality();
            let output = TrainOutput {
                model: output,
                n_train: report.n_train,
                n_test: report.n_test,
                quality_accuracy: report.quality_accuracy,
                diagnostics_accuracy: report.diagnostics_accuracy,
                quality_nodes: quality.n_nodes(),
                quality_depth: quality.depth(),
                tiers: report.evaluation.tiers.clone(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Predict {
            model,
            co2,
            co,
            pm25,
            temperature,
            humidity,
        } => {
            let bundle = load_model(&model)?;
            let reading = SensorReading::new(co2, co, pm25, temperature, humidity);
            let assessment = bundle.assess(&reading).context("assessment failed")?;
            println!("{}", serde_json::to_string_pretty(&assessment)?);
        }

        Command::Batch { model, input } => {
            let bundle = load_model(&model)?;
            let readings = ReadingsReader::new(&input)
                .read()
                .context("failed to read readings CSV")?;
            info!(n_readings = readings.len(), "readings loaded");

            let assessments = bundle
                .assess_batch(&readings)
                .context("batch assessment failed")?;
            let output = BatchOutput {
                n_readings: assessments.len(),
                n_flagged: assessments
                    .iter()
                    .filter(|a| !a.problematic_sensors.is_empty())
                    .count(),
                assessments,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
