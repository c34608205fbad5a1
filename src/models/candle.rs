use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily OHLCV candle for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub id: String,
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Candle {
    /// Build a candle with a freshly generated identifier.
    pub fn new(
        ticker: &str,
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: i64,
    ) -> Self {
        Candle {
            id: uuid::Uuid::new_v4().to_string(),
            ticker: ticker.to_string(),
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}
