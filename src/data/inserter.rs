use tracing::debug;

use crate::errors::AppError;
use crate::models::candle::Candle;

use super::storage::CandleStore;

/// Counts of work done (or to be done) for one insert run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InsertSummary {
    pub rows: usize,
    pub statements: usize,
    pub transactions: usize,
}

/// Expected statement and transaction counts for `rows` candles.
///
/// `batch_size` and `statements_per_tx` must be non-zero.
pub fn plan(rows: usize, batch_size: usize, statements_per_tx: usize) -> InsertSummary {
    InsertSummary {
        rows,
        statements: rows.div_ceil(batch_size),
        transactions: rows.div_ceil(batch_size * statements_per_tx),
    }
}

/// Persist `candles` in order: `batch_size` rows per INSERT statement,
/// `statements_per_tx` statements per transaction. The trailing statement
/// carries whatever is left over.
///
/// The first failing transaction aborts the run. Transactions committed
/// before it stay committed.
pub fn insert_candles<S: CandleStore + ?Sized>(
    store: &mut S,
    candles: &[Candle],
    batch_size: usize,
    statements_per_tx: usize,
) -> Result<InsertSummary, AppError> {
    if batch_size == 0 || statements_per_tx == 0 {
        return Err(AppError::Config(
            "batch size and statements per transaction must be non-zero".to_string(),
        ));
    }

    let mut summary = InsertSummary {
        rows: candles.len(),
        ..Default::default()
    };

    for tx_rows in candles.chunks(batch_size * statements_per_tx) {
        let statements: Vec<&[Candle]> = tx_rows.chunks(batch_size).collect();
        store.insert_transaction(&statements)?;

        summary.statements += statements.len();
        summary.transactions += 1;
        debug!(
            "Transaction {}: {} rows in {} statements",
            summary.transactions,
            tx_rows.len(),
            statements.len()
        );
    }

    Ok(summary)
}
