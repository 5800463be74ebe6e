use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use iris_knn::{ExampleStore, QueryPoint, load_from_path, predict};

/// Predict the species of an Iris specimen from its measurements.
#[derive(Debug, Parser)]
#[command(name = "iris-knn", version)]
struct Cli {
    /// Training data: one `sepal_length,sepal_width,petal_length,petal_width,species` row per line.
    #[arg(long, env = "IRIS_KNN_DATA", default_value = "data/iris.csv")]
    data: PathBuf,

    /// Number of neighbors that vote.
    #[arg(short = 'k', long = "neighbors", default_value_t = 3)]
    k: usize,

    #[arg(long, default_value_t = 6.5, allow_negative_numbers = true)]
    sepal_length: f64,

    #[arg(long, default_value_t = 3.0, allow_negative_numbers = true)]
    sepal_width: f64,

    #[arg(long, default_value_t = 5.4, allow_negative_numbers = true)]
    petal_length: f64,

    #[arg(long, default_value_t = 2.4, allow_negative_numbers = true)]
    petal_width: f64,
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    let mut store = ExampleStore::new();
    let summary = load_from_path(&cli.data, &mut store)?;
    if !summary.skipped.is_empty() {
        tracing::info!(skipped = summary.skipped.len(), "some training rows were skipped");
    }

    let query = QueryPoint::new([cli.sepal_length, cli.sepal_width, cli.petal_length, cli.petal_width]);
    let species = predict(&store, &query, cli.k)
        .with_context(|| format!("prediction failed for {}", cli.data.display()))?;

    println!("Predicted species: {species}");
    Ok(())
}

fn init_logging() {
    let default_level = "warn";
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
