use std::path::PathBuf;

use crate::errors::AppError;

/// Rows packed into one multi-row INSERT by default.
pub const DEFAULT_BATCH_SIZE: usize = 50;
/// INSERT statements grouped into one transaction by default.
pub const DEFAULT_STATEMENTS_PER_TX: usize = 10;
/// Bound parameters per candle row: id, date, ticker, open, high, low, close, volume.
pub const PARAMS_PER_CANDLE: usize = 8;
/// SQLite's default SQLITE_MAX_VARIABLE_NUMBER since 3.32.
pub const SQLITE_MAX_PARAMS: usize = 32_766;

/// Everything a seeding run needs. Built once and passed down explicitly.
#[derive(Debug, Clone)]
pub struct SeederConfig {
    /// SQLite target: file path, `file:` URI or `:memory:`.
    pub dsn: String,
    /// Directory holding one `<TICKER>.csv` per ticker.
    pub data_dir: PathBuf,
    pub layout: LayoutMode,
    pub batch_size: usize,
    pub statements_per_tx: usize,
}

impl SeederConfig {
    pub fn new(dsn: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        SeederConfig {
            dsn: dsn.into(),
            data_dir: data_dir.into(),
            layout: LayoutMode::Fixed(CsvLayout::Iso),
            batch_size: DEFAULT_BATCH_SIZE,
            statements_per_tx: DEFAULT_STATEMENTS_PER_TX,
        }
    }

    /// Reject settings that would fail later against the database.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.dsn.trim().is_empty() {
            return Err(AppError::Config("DSN is empty".to_string()));
        }
        if self.batch_size == 0 {
            return Err(AppError::Config("batch size must be at least 1".to_string()));
        }
        if self.statements_per_tx == 0 {
            return Err(AppError::Config(
                "statements per transaction must be at least 1".to_string(),
            ));
        }
        let params = self.batch_size.saturating_mul(PARAMS_PER_CANDLE);
        if params > SQLITE_MAX_PARAMS {
            return Err(AppError::Config(format!(
                "batch size {} needs {} bound parameters, SQLite allows {}",
                self.batch_size, params, SQLITE_MAX_PARAMS
            )));
        }
        Ok(())
    }
}

/// Supported CSV provider layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CsvLayout {
    /// `Date(YYYY-MM-DD),Open,High,Low,Close,*,Volume`
    Iso,
    /// `Date(MM/DD/YYYY),Close/Last,Volume,Open,High,Low`
    Us,
}

/// Column mapping for one layout. Adding a provider means adding a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSpec {
    pub date: usize,
    pub date_format: &'static str,
    pub open: usize,
    pub high: usize,
    pub low: usize,
    pub close: usize,
    pub volume: usize,
}

const ISO_LAYOUT: LayoutSpec = LayoutSpec {
    date: 0,
    date_format: "%Y-%m-%d",
    open: 1,
    high: 2,
    low: 3,
    close: 4,
    volume: 6,
};

const US_LAYOUT: LayoutSpec = LayoutSpec {
    date: 0,
    date_format: "%m/%d/%Y",
    close: 1,
    volume: 2,
    open: 3,
    high: 4,
    low: 5,
};

impl CsvLayout {
    pub fn spec(&self) -> &'static LayoutSpec {
        match self {
            CsvLayout::Iso => &ISO_LAYOUT,
            CsvLayout::Us => &US_LAYOUT,
        }
    }

    /// Guess the layout from a header row. The US provider labels its
    /// second column `Close/Last`; anything else is treated as ISO.
    pub fn detect<S: AsRef<str>>(header: &[S]) -> CsvLayout {
        match header.get(1) {
            Some(col) if col.as_ref().trim().to_lowercase().starts_with("close") => CsvLayout::Us,
            _ => CsvLayout::Iso,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CsvLayout::Iso => "iso",
            CsvLayout::Us => "us",
        }
    }
}

impl std::fmt::Display for CsvLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the layout of each file is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Fixed(CsvLayout),
    /// Detect per file from its header row.
    Auto,
}

impl LayoutMode {
    pub fn resolve<S: AsRef<str>>(&self, header: &[S]) -> CsvLayout {
        match self {
            LayoutMode::Fixed(layout) => *layout,
            LayoutMode::Auto => CsvLayout::detect(header),
        }
    }
}

impl std::str::FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "iso" | "a" => Ok(LayoutMode::Fixed(CsvLayout::Iso)),
            "us" | "b" => Ok(LayoutMode::Fixed(CsvLayout::Us)),
            "auto" => Ok(LayoutMode::Auto),
            _ => Err(format!("Unknown layout: {} (expected iso, us or auto)", s)),
        }
    }
}
