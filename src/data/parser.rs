use chrono::NaiveDate;
use csv::StringRecord;

use crate::errors::AppError;
use crate::models::candle::Candle;
use crate::models::config::LayoutSpec;

/// Remove every `$` from a price field. Fields without one are returned unchanged.
pub fn strip_currency(s: &str) -> String {
    s.replace('$', "")
}

/// Parse all data rows of one ticker's file. Stops at the first bad row.
///
/// `row` numbers in errors are 1-based and count data rows only.
pub fn parse_candles(
    ticker: &str,
    rows: &[StringRecord],
    layout: &LayoutSpec,
) -> Result<Vec<Candle>, AppError> {
    if ticker.trim().is_empty() {
        return Err(AppError::InvalidTicker(format!("'{}'", ticker)));
    }

    let mut candles = Vec::with_capacity(rows.len());
    for (i, record) in rows.iter().enumerate() {
        candles.push(parse_candle(ticker, i + 1, record, layout)?);
    }
    Ok(candles)
}

/// Convert one raw row into a `Candle` using the layout's column table.
pub fn parse_candle(
    ticker: &str,
    row: usize,
    record: &StringRecord,
    layout: &LayoutSpec,
) -> Result<Candle, AppError> {
    let raw_date = field(record, layout.date, "date", row)?;
    let date = NaiveDate::parse_from_str(raw_date, layout.date_format).map_err(|e| {
        AppError::Parse {
            row,
            field: "date",
            message: format!("'{}' does not match {}: {}", raw_date, layout.date_format, e),
        }
    })?;

    let open = price(record, layout.open, "open", row)?;
    let high = price(record, layout.high, "high", row)?;
    let low = price(record, layout.low, "low", row)?;
    let close = price(record, layout.close, "close", row)?;
    let volume = volume(field(record, layout.volume, "volume", row)?);

    Ok(Candle::new(ticker, date, open, high, low, close, volume))
}

fn field<'r>(
    record: &'r StringRecord,
    index: usize,
    name: &'static str,
    row: usize,
) -> Result<&'r str, AppError> {
    record.get(index).map(str::trim).ok_or_else(|| AppError::Parse {
        row,
        field: name,
        message: format!("missing column {} (row has {} fields)", index, record.len()),
    })
}

fn price(record: &StringRecord, index: usize, name: &'static str, row: usize) -> Result<f64, AppError> {
    let raw = field(record, index, name, row)?;
    let value = strip_currency(raw).parse::<f64>().map_err(|e| AppError::Parse {
        row,
        field: name,
        message: format!("'{}' is not a number: {}", raw, e),
    })?;
    if !value.is_finite() {
        return Err(AppError::Parse {
            row,
            field: name,
            message: format!("'{}' is not a finite number", raw),
        });
    }
    Ok(value)
}

/// Lenient: anything that is not a non-negative integer becomes 0.
fn volume(raw: &str) -> i64 {
    match raw.parse::<i64>() {
        Ok(v) if v >= 0 => v,
        _ => 0,
    }
}
