use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::TrainConfig;

/// Position-debiased UFC fight outcome predictor
#[derive(Parser, Debug, Clone)]
#[command(name = "ufc_predictor", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Assemble, augment and fit; write the model bundle
    Train(TrainArgs),
    /// Predict the winner between two fighters
    Predict(PredictArgs),
    /// List every fighter in the stats table
    Fighters(StatsArgs),
    /// Write the assembled (non-augmented) training rows to CSV
    Export(ExportArgs),
}

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    /// Fighter statistics CSV
    #[arg(long, env = "UFC_STATS_PATH", default_value = "data/fighter_data.csv")]
    pub stats: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    #[command(flatten)]
    pub stats: StatsArgs,

    /// Historical fight results CSV
    #[arg(long, env = "UFC_FIGHTS_PATH", default_value = "data/UFC_Events.csv")]
    pub fights: PathBuf,

    /// Where to write the model bundle
    #[arg(long, env = "UFC_MODEL_PATH", default_value = "models/ufc_model.json")]
    pub model: PathBuf,

    /// Share of augmented rows held out for evaluation
    #[arg(long, default_value = "0.3")]
    pub test_ratio: f64,

    /// Seed for the train/test shuffle
    #[arg(long, env = "UFC_SPLIT_SEED", default_value = "42")]
    pub seed: u64,

    #[arg(long, default_value = "300")]
    pub max_iterations: u64,

    #[arg(long, default_value = "0.0001")]
    pub gradient_tolerance: f64,

    /// L2 regularisation strength
    #[arg(long, default_value = "1.0")]
    pub alpha: f64,

    /// Also save a bar chart of the fitted feature weights
    #[arg(long)]
    pub plot: Option<PathBuf>,
}

impl TrainArgs {
    pub fn train_config(&self) -> TrainConfig {
        TrainConfig {
            test_ratio: self.test_ratio,
            split_seed: self.seed,
            max_iterations: self.max_iterations,
            gradient_tolerance: self.gradient_tolerance,
            alpha: self.alpha,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.train_config().validate()?;
        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub stats: StatsArgs,

    /// Model bundle written by `train`
    #[arg(long, env = "UFC_MODEL_PATH", default_value = "models/ufc_model.json")]
    pub model: PathBuf,

    /// Fighter in the red (first) position
    pub red_fighter: String,

    /// Fighter in the blue (second) position
    pub blue_fighter: String,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub stats: StatsArgs,

    #[arg(long, env = "UFC_FIGHTS_PATH", default_value = "data/UFC_Events.csv")]
    pub fights: PathBuf,

    /// Output CSV
    #[arg(long, default_value = "training_rows.csv")]
    pub out: PathBuf,
}
