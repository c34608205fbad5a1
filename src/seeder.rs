use serde::Serialize;
use tracing::info;

use crate::data::inserter::{insert_candles, InsertSummary};
use crate::data::parser::parse_candles;
use crate::data::source::{CandleSource, SourceEntry};
use crate::data::storage::CandleStore;
use crate::errors::AppError;
use crate::models::config::SeederConfig;

/// Rows written for one ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerLoad {
    pub ticker: String,
    pub rows: usize,
    pub statements: usize,
    pub transactions: usize,
}

/// Outcome of a successful seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub loaded: Vec<TickerLoad>,
    pub skipped: Vec<String>,
}

impl SeedReport {
    pub fn total_rows(&self) -> usize {
        self.loaded.iter().map(|l| l.rows).sum()
    }
}

/// Load every ticker file from `source` into `store`, one ticker at a time.
///
/// Tickers that already have rows are skipped without reading their file.
/// The first error from any stage ends the run; tickers loaded before it
/// stay loaded.
pub fn seed<S, T>(source: &S, store: &mut T, config: &SeederConfig) -> Result<SeedReport, AppError>
where
    S: CandleSource + ?Sized,
    T: CandleStore + ?Sized,
{
    let mut report = SeedReport::default();

    for entry in source.entries()? {
        let ticker = entry.ticker.as_str();

        if store.ticker_exists(ticker).map_err(|e| e.for_ticker(ticker))? {
            info!("Data for ticker '{}' already exists. Skipping.", ticker);
            report.skipped.push(entry.ticker.clone());
            continue;
        }

        info!("Inserting data for '{}'.", ticker);
        let summary = seed_ticker(source, store, &entry, config).map_err(|e| e.for_ticker(ticker))?;
        info!(
            "Loaded {} rows for '{}' ({} statements, {} transactions)",
            summary.rows, ticker, summary.statements, summary.transactions
        );

        report.loaded.push(TickerLoad {
            ticker: entry.ticker.clone(),
            rows: summary.rows,
            statements: summary.statements,
            transactions: summary.transactions,
        });
    }

    if report.total_rows() == 0 {
        info!("No data to seed.");
    } else {
        info!("Successfully inserted data.");
    }
    info!(
        "Seeding finished: {} tickers loaded ({} rows), {} skipped",
        report.loaded.len(),
        report.total_rows(),
        report.skipped.len()
    );

    Ok(report)
}

/// Read, parse, then insert one file. Nothing is inserted unless the
/// whole file parses.
fn seed_ticker<S, T>(
    source: &S,
    store: &mut T,
    entry: &SourceEntry,
    config: &SeederConfig,
) -> Result<InsertSummary, AppError>
where
    S: CandleSource + ?Sized,
    T: CandleStore + ?Sized,
{
    let csv = source.read(entry)?;
    let layout = config.layout.resolve(csv.header.as_slice());
    let candles = parse_candles(&entry.ticker, &csv.rows, layout.spec())?;
    info!("Parsed {} candles from {} ({} layout)", candles.len(), entry.path.display(), layout);

    insert_candles(store, &candles, config.batch_size, config.statements_per_tx)
}
