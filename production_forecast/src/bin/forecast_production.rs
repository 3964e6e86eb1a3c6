//! Production forecast CLI
//!
//! Loads historical observations and a trained model, runs the rolling
//! forecaster and writes one prediction per group and future date.

use anyhow::Context;
use clap::Parser;
use production_forecast::output::write_csv;
use production_forecast::{
    DataLoader, ForecastConfig, HistoricalFeatureBuilder, LinearModel, RollingForecaster,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "forecast_production")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Rolling multi-step forecast of bank/product production", long_about = None)]
struct Cli {
    /// Historical observations (CSV or Parquet)
    #[arg(short, long)]
    data: PathBuf,

    /// Trained linear model (JSON)
    #[arg(short, long)]
    model: PathBuf,

    /// Run configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of future days, overriding the configuration
    #[arg(long)]
    horizon: Option<usize>,

    /// Output forecast file (CSV)
    #[arg(short, long)]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "production_forecast=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ForecastConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ForecastConfig::default(),
    };
    if let Some(horizon) = cli.horizon {
        config.horizon = horizon;
    }
    config.validate().context("Invalid configuration")?;

    let observations = DataLoader::from_path(&cli.data)
        .with_context(|| format!("Failed to load data from {}", cli.data.display()))?;

    let table = HistoricalFeatureBuilder::new(config.calendar())
        .build(&observations)
        .context("Failed to build historical features")?;

    let model = LinearModel::from_json_file(&cli.model)
        .with_context(|| format!("Failed to load model from {}", cli.model.display()))?;

    let forecast = RollingForecaster::new(model, config.calendar(), config)
        .and_then(|forecaster| forecaster.forecast(&table))
        .context("Forecast failed")?;

    write_csv(forecast.records(), &cli.output)
        .with_context(|| format!("Failed to write forecast to {}", cli.output.display()))?;

    info!(
        rows = forecast.records().len(),
        output = %cli.output.display(),
        "Done"
    );

    Ok(())
}
