pub mod cli;
pub mod data;
pub mod errors;
pub mod models;
pub mod seeder;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::data::source::DirectorySource;
use crate::data::storage::initialize_database;
use crate::errors::{AppError, ErrorResponse};
use crate::seeder::SeedReport;

/// Entry point for the `candle-seeder` binary.
pub fn run() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting candle seeder");

    let result = seed_from_args(&args);

    if args.json {
        let json = match &result {
            Ok(report) => serde_json::to_string_pretty(report)?,
            Err(e) => serde_json::to_string_pretty(&ErrorResponse::from(e))?,
        };
        println!("{}", json);
    }

    result.context("could not seed data")?;
    Ok(())
}

/// Resolve configuration, open the database, and seed from the data directory.
pub fn seed_from_args(args: &cli::Args) -> Result<SeedReport, AppError> {
    let config = cli::load_config(args)?;
    info!(
        "Seeding from {} (layout={:?}, batch_size={}, statements_per_tx={})",
        config.data_dir.display(),
        config.layout,
        config.batch_size,
        config.statements_per_tx
    );

    let mut store = initialize_database(&config.dsn)?;
    let source = DirectorySource::new(&config.data_dir);
    seeder::seed(&source, &mut store, &config)
}
