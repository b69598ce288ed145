//! Wire the pipeline stages to the command line: train, predict, list fighters, export rows.
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use ufc_predictor::config::{Cli, Command, ExportArgs, PredictArgs, StatsArgs, TrainArgs};
use ufc_predictor::plot::plot_weights;
use ufc_predictor::preprocess::{augment, build_training_rows, TrainingRow};
use ufc_predictor::{io, model, DebiasedPredictor, StatsStore};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Train(args) => train(args),
        Command::Predict(args) => predict(args),
        Command::Fighters(args) => fighters(args),
        Command::Export(args) => export(args),
    }
}

/// load both feeds, assemble labelled rows, augment, fit, save the bundle
fn train(args: TrainArgs) -> Result<()> {
    args.validate()?;
    let config = args.train_config();

    // 1) Load the two data feeds
    let store = StatsStore::load(&args.stats.stats)
        .with_context(|| format!("loading fighter stats from {}", args.stats.stats.display()))?;
    let fights = io::load_fights(&args.fights)
        .with_context(|| format!("loading fights from {}", args.fights.display()))?;
    info!(fighters = store.len(), fights = fights.len(), "data loaded");

    // 2) Label, build differentials, mirror
    let (assembled, _report) = build_training_rows(&fights, &store);
    let rows: Vec<TrainingRow> = assembled.iter().map(|r| r.row).collect();
    let augmented = augment(&rows);
    info!(original = rows.len(), augmented = augmented.len(), "dataset ready");

    // 3) Fit and persist
    let trained = model::fit(&augmented, &config).context("training model")?;
    trained
        .save(&args.model)
        .with_context(|| format!("saving model to {}", args.model.display()))?;

    let meta = trained.metadata();
    println!("Accuracy: {:.4}", meta.test_accuracy);
    println!(
        "Trained on {} rows, evaluated on {} rows, {} features",
        meta.num_training_samples, meta.num_test_samples, meta.num_features
    );
    println!("\nFeature weights:");
    let ranked = trained.classifier().ranked_weights();
    for (name, weight) in &ranked {
        println!("{:<30} {:>8.4}", name, weight);
    }

    // 4) Optional chart
    if let Some(path) = &args.plot {
        plot_weights(&ranked, path).map_err(|e| anyhow::anyhow!("plotting weights: {}", e))?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn predict(args: PredictArgs) -> Result<()> {
    let predictor = DebiasedPredictor::load(&args.stats.stats, &args.model)
        .context("starting predictor")?;
    let prediction = predictor.predict(&args.red_fighter, &args.blue_fighter)?;
    println!("{}", serde_json::to_string_pretty(&prediction)?);
    Ok(())
}

fn fighters(args: StatsArgs) -> Result<()> {
    let store = StatsStore::load(&args.stats)
        .with_context(|| format!("loading fighter stats from {}", args.stats.display()))?;
    for name in store.list_names() {
        println!("{}", name);
    }
    Ok(())
}

fn export(args: ExportArgs) -> Result<()> {
    let store = StatsStore::load(&args.stats.stats)
        .with_context(|| format!("loading fighter stats from {}", args.stats.stats.display()))?;
    let fights = io::load_fights(&args.fights)
        .with_context(|| format!("loading fights from {}", args.fights.display()))?;
    let (assembled, _report) = build_training_rows(&fights, &store);
    io::write_rows(&args.out, &assembled)
        .with_context(|| format!("writing {}", args.out.display()))?;
    println!("Wrote {} rows to {}", assembled.len(), args.out.display());
    Ok(())
}
