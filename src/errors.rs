use serde::Serialize;

/// All seeder errors, categorized by pipeline stage.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ── Configuration ──
    #[error("Invalid configuration: {0}")]
    Config(String),

    // ── Database ──
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Database query failed: {0}")]
    Query(String),

    #[error("Insert failed: {0}")]
    Insert(String),

    // ── Files ──
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read file: {0}")]
    FileRead(String),

    #[error("Malformed CSV: {0}")]
    CsvFormat(String),

    // ── Parsing ──
    #[error("Parse error at row {row}, field '{field}': {message}")]
    Parse {
        row: usize,
        field: &'static str,
        message: String,
    },

    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    // ── Serialization ──
    #[error("Serialization error: {0}")]
    Serialization(String),

    // ── Context ──
    #[error("ticker '{ticker}': {inner}")]
    Ticker { ticker: String, inner: Box<AppError> },
}

impl AppError {
    /// Attach the ticker being processed to a stage error.
    pub fn for_ticker(self, ticker: &str) -> Self {
        AppError::Ticker {
            ticker: ticker.to_string(),
            inner: Box::new(self),
        }
    }

    /// Short stage code, used in the JSON report and in logs.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG",
            AppError::Connection(_) => "CONNECTION",
            AppError::Query(_) => "QUERY",
            AppError::Insert(_) => "INSERT",
            AppError::FileNotFound(_) => "FILE_NOT_FOUND",
            AppError::FileRead(_) => "FILE_READ",
            AppError::CsvFormat(_) => "CSV_FORMAT",
            AppError::Parse { .. } => "PARSE",
            AppError::InvalidTicker(_) => "INVALID_TICKER",
            AppError::Serialization(_) => "SERIALIZATION",
            AppError::Ticker { inner, .. } => inner.code(),
        }
    }
}

/// Serializable error summary.
#[derive(Debug, Serialize, Clone)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        ErrorResponse {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

// ── Conversions from external errors ──

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Query(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            AppError::FileRead(err.to_string())
        } else {
            AppError::CsvFormat(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileRead(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_context_keeps_stage_code() {
        let err = AppError::Parse {
            row: 3,
            field: "date",
            message: "bad".to_string(),
        }
        .for_ticker("AAPL");
        assert_eq!(err.code(), "PARSE");
        let msg = err.to_string();
        assert!(msg.contains("AAPL"));
        assert!(msg.contains("row 3"));
    }

    #[test]
    fn test_error_response_from_app_error() {
        let err = AppError::Config("DSN is not set".to_string());
        let resp = ErrorResponse::from(&err);
        assert_eq!(resp.code, "CONFIG");
        assert_eq!(resp.message, "Invalid configuration: DSN is not set");
    }
}
