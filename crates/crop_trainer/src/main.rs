//! CropForest CLI
//!
//! Trains the crop recommendation forest and exercises it from the command
//! line: held-out evaluation, single predictions and corpus summaries.

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use cropforest_core::{
    crop_profile, extract_features_from_description, FeatureInput, FeatureVector, ForestConfig,
};
use cropforest_trainer::{
    generate_training_data, CorpusSummary, Evaluator, ModelLifecycle, REFERENCE_SCENARIOS,
    VERSION,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "cropforest")]
#[command(version = VERSION)]
#[command(about = "Random forest crop recommendation from soil and climate features", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Random seed (overrides the configured seed; unseeded runs use OS entropy)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train on 80% of a generated corpus and report held-out accuracy
    Evaluate,

    /// Rank crops for one plot
    Predict(PredictArgs),

    /// Per-crop sample counts and feature means of the generated corpus
    Summary,

    /// Predict the built-in reference plots
    Scenarios,
}

#[derive(ClapArgs, Debug)]
struct PredictArgs {
    /// Free-text land description (replaces the numeric flags)
    #[arg(long, conflicts_with_all = ["soil_ph", "nitrogen", "phosphorus", "potassium", "temperature", "humidity", "rainfall", "soil_type"])]
    description: Option<String>,

    /// Region of the described plot
    #[arg(long, default_value = "unspecified", requires = "description")]
    region: String,

    #[arg(long)]
    soil_ph: Option<f64>,

    /// Nitrogen, kg/ha
    #[arg(long)]
    nitrogen: Option<f64>,

    /// Phosphorus, kg/ha
    #[arg(long)]
    phosphorus: Option<f64>,

    /// Potassium, kg/ha
    #[arg(long)]
    potassium: Option<f64>,

    /// Temperature, °C
    #[arg(long)]
    temperature: Option<f64>,

    /// Relative humidity, %
    #[arg(long)]
    humidity: Option<f64>,

    /// Rainfall, cm
    #[arg(long)]
    rainfall: Option<f64>,

    /// Sandy, Loamy, Clay, Red, Black or Alluvial
    #[arg(long)]
    soil_type: Option<String>,

    /// Print every candidate instead of the filtered top list
    #[arg(long)]
    all: bool,
}

impl PredictArgs {
    fn features(&self, rng: &mut StdRng) -> Result<FeatureVector> {
        if let Some(description) = &self.description {
            return Ok(extract_features_from_description(description, &self.region, rng));
        }

        let input = FeatureInput {
            soil_ph: self.soil_ph,
            nitrogen: self.nitrogen,
            phosphorus: self.phosphorus,
            potassium: self.potassium,
            temperature: self.temperature,
            humidity: self.humidity,
            rainfall: self.rainfall,
            soil_type: self.soil_type.clone(),
        };
        FeatureVector::try_from(input).context("Invalid plot features")
    }
}

fn load_config(args: &Args) -> Result<ForestConfig> {
    let mut config = match &args.config {
        Some(path) => ForestConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ForestConfig::default(),
    };
    if args.seed.is_some() {
        config.training.random_seed = args.seed;
    }
    Ok(config)
}

fn rng_for(config: &ForestConfig) -> StdRng {
    match config.training.random_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    // Setup logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        config.logging.tracing_level()?
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("CropForest v{}", VERSION);
    info!(
        "Model: {} trees, max depth {}, min samples to split {}",
        config.model.num_trees, config.model.max_depth, config.model.min_samples_split
    );

    match &args.command {
        Command::Evaluate => {
            let evaluator = Evaluator::new(config.model.clone(), &config.training);
            let report = evaluator
                .evaluate(&mut rng_for(&config))
                .context("Evaluation failed")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Predict(predict) => {
            let features = predict.features(&mut rng_for(&config))?;
            let lifecycle = ModelLifecycle::new(&config);
            let ranked = if predict.all {
                lifecycle.get_ml_predictions(&features)?
            } else {
                lifecycle.recommend(&features)?
            };

            let labelled: Vec<_> = ranked
                .iter()
                .map(|p| {
                    let profile = crop_profile(&p.crop);
                    serde_json::json!({
                        "crop": p.crop,
                        "label": profile.map(|c| c.label),
                        "confidence": p.confidence,
                        "votes": p.votes,
                        "suits_soil": profile.map(|c| c.prefers_soil(features.soil_type)),
                    })
                })
                .collect();
            let output = serde_json::json!({
                "features": features,
                "predictions": labelled,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Summary => {
            let corpus = generate_training_data(&mut rng_for(&config));
            let summary = CorpusSummary::from_samples(&corpus);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Scenarios => {
            let lifecycle = ModelLifecycle::new(&config);
            for (idx, scenario) in REFERENCE_SCENARIOS.iter().enumerate() {
                println!("Test Case {}: {}", idx + 1, scenario.description);
                let ranked = lifecycle.get_ml_predictions(&scenario.features)?;
                for (rank, p) in ranked.iter().take(3).enumerate() {
                    println!(
                        "  {}. {} - {:.1}% confidence",
                        rank + 1,
                        p.crop,
                        p.confidence * 100.0
                    );
                }
                println!();
            }
        }
    }

    Ok(())
}
