use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::errors::AppError;

use super::reader::{read_csv, RawCsv};

/// One ticker file found in the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub ticker: String,
    pub path: PathBuf,
}

/// Where ticker files come from. `DirectorySource` is the real one.
pub trait CandleSource {
    /// Ticker files in processing order.
    fn entries(&self) -> Result<Vec<SourceEntry>, AppError>;

    /// Read one ticker file fully into memory.
    fn read(&self, entry: &SourceEntry) -> Result<RawCsv, AppError>;
}

/// A directory of `<TICKER>.csv` files.
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectorySource { dir: dir.into() }
    }
}

impl CandleSource for DirectorySource {
    fn entries(&self) -> Result<Vec<SourceEntry>, AppError> {
        let listing = std::fs::read_dir(&self.dir).map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::FileNotFound(self.dir.display().to_string()),
            _ => AppError::FileRead(format!("{}: {}", self.dir.display(), e)),
        })?;

        let mut paths = Vec::new();
        for dir_entry in listing {
            let dir_entry = dir_entry?;
            let path = dir_entry.path();
            if dir_entry.file_type()?.is_dir() {
                warn!("Skipping directory {}", path.display());
                continue;
            }
            if !is_csv(&path) {
                warn!("Skipping non-CSV file {}", path.display());
                continue;
            }
            paths.push(path);
        }
        paths.sort();

        paths
            .into_iter()
            .map(|path| {
                let ticker = ticker_from_path(&path)?;
                Ok(SourceEntry { ticker, path })
            })
            .collect()
    }

    fn read(&self, entry: &SourceEntry) -> Result<RawCsv, AppError> {
        read_csv(&entry.path)
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// The ticker is the file name without its final extension: `BRK.B.csv` -> `BRK.B`.
pub fn ticker_from_path(path: &Path) -> Result<String, AppError> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().trim().to_string())
        .unwrap_or_default();
    if stem.is_empty() {
        return Err(AppError::InvalidTicker(path.display().to_string()));
    }
    Ok(stem)
}
