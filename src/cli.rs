use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::debug;

use crate::errors::AppError;
use crate::models::config::{
    LayoutMode, SeederConfig, DEFAULT_BATCH_SIZE, DEFAULT_STATEMENTS_PER_TX,
};

/// Environment variable holding the database DSN.
pub const DSN_VAR: &str = "DSN";

#[derive(Parser, Debug)]
#[command(
    name = "candle-seeder",
    about = "Bulk-load per-ticker OHLCV CSV files into the candles table"
)]
pub struct Args {
    /// Database DSN (SQLite path, file: URI or :memory:). Defaults to $DSN.
    #[arg(long)]
    pub dsn: Option<String>,

    /// Directory of <TICKER>.csv files.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Env file to load before reading $DSN. Defaults to .env if present.
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Column layout: iso, us, or auto (detect from each header).
    #[arg(long, default_value = "iso")]
    pub layout: LayoutMode,

    /// Rows per INSERT statement.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// INSERT statements per transaction.
    #[arg(long, default_value_t = DEFAULT_STATEMENTS_PER_TX)]
    pub statements_per_tx: usize,

    /// Print the run report (or error) to stdout as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Load the env file, then build and validate the run configuration.
pub fn load_config(args: &Args) -> Result<SeederConfig, AppError> {
    load_env_file(args.env_file.as_deref())?;
    resolve_config(args, std::env::var(DSN_VAR).ok())
}

/// Build the configuration from parsed flags and the DSN found in the
/// environment, if any. The `--dsn` flag wins over the environment.
pub fn resolve_config(args: &Args, env_dsn: Option<String>) -> Result<SeederConfig, AppError> {
    let dsn = args
        .dsn
        .clone()
        .or(env_dsn)
        .ok_or_else(|| AppError::Config(format!("{} is not set", DSN_VAR)))?;

    let config = SeederConfig {
        dsn,
        data_dir: args.data_dir.clone(),
        layout: args.layout,
        batch_size: args.batch_size,
        statements_per_tx: args.statements_per_tx,
    };
    config.validate()?;
    Ok(config)
}

/// An explicitly requested env file must exist; the default `.env` is optional.
fn load_env_file(path: Option<&Path>) -> Result<(), AppError> {
    match path {
        Some(p) => {
            dotenvy::from_path(p).map_err(|e| {
                AppError::Config(format!("could not load env file '{}': {}", p.display(), e))
            })?;
            debug!("Loaded environment from {}", p.display());
        }
        None => match dotenvy::dotenv() {
            Ok(p) => debug!("Loaded environment from {}", p.display()),
            Err(e) if e.not_found() => debug!("No .env file found"),
            Err(e) => return Err(AppError::Config(format!("could not load .env: {}", e))),
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::CsvLayout;

    fn parse(argv: &[&str]) -> Args {
        let mut full = vec!["candle-seeder"];
        full.extend_from_slice(argv);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.data_dir, PathBuf::from("data"));
        assert_eq!(args.layout, LayoutMode::Fixed(CsvLayout::Iso));
        assert_eq!(args.batch_size, 50);
        assert_eq!(args.statements_per_tx, 10);
        assert!(!args.json);
    }

    #[test]
    fn test_flags() {
        let args = parse(&[
            "--dsn", "seed.db", "--data-dir", "csv", "--layout", "auto", "--batch-size", "20",
            "--statements-per-tx", "5", "--json",
        ]);
        assert_eq!(args.dsn.as_deref(), Some("seed.db"));
        assert_eq!(args.layout, LayoutMode::Auto);
        assert_eq!(args.batch_size, 20);
        assert_eq!(args.statements_per_tx, 5);
        assert!(args.json);
    }

    #[test]
    fn test_unknown_layout_rejected() {
        let argv = ["candle-seeder", "--layout", "xml"];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_flag_dsn_wins_over_env() {
        let args = parse(&["--dsn", "flag.db"]);
        let config = resolve_config(&args, Some("env.db".to_string())).unwrap();
        assert_eq!(config.dsn, "flag.db");
    }

    #[test]
    fn test_env_dsn_used_when_no_flag() {
        let args = parse(&[]);
        let config = resolve_config(&args, Some("env.db".to_string())).unwrap();
        assert_eq!(config.dsn, "env.db");
    }

    #[test]
    fn test_missing_dsn_is_config_error() {
        let args = parse(&[]);
        let err = resolve_config(&args, None).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_invalid_batch_size_is_config_error() {
        let args = parse(&["--dsn", "seed.db", "--batch-size", "0"]);
        assert!(resolve_config(&args, None).is_err());
    }

    #[test]
    fn test_missing_explicit_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_env_file(Some(&dir.path().join("missing.env"))).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
