use rusqlite::types::ToSql;
use rusqlite::{params, params_from_iter, Connection};
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::models::candle::Candle;
use crate::models::config::PARAMS_PER_CANDLE;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS candles (
        id      TEXT PRIMARY KEY,
        ticker  TEXT NOT NULL,
        date    TEXT NOT NULL,
        open    REAL NOT NULL,
        high    REAL NOT NULL,
        low     REAL NOT NULL,
        close   REAL NOT NULL,
        volume  INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_candles_ticker ON candles (ticker);
";

/// Persistence seam used by the seeder. `SqliteStore` is the real one;
/// tests substitute in-memory fakes.
pub trait CandleStore {
    /// Whether at least one candle for `ticker` is already stored.
    fn ticker_exists(&self, ticker: &str) -> Result<bool, AppError>;

    /// Execute one multi-row INSERT per slice, all inside a single
    /// transaction. Any failure rolls the whole transaction back.
    fn insert_transaction(&mut self, statements: &[&[Candle]]) -> Result<(), AppError>;
}

/// SQLite-backed candle store holding the run's single connection.
pub struct SqliteStore {
    conn: Connection,
}

/// Open the database at `dsn`, verify it answers, and create the schema if absent.
pub fn initialize_database(dsn: &str) -> Result<SqliteStore, AppError> {
    let conn = Connection::open(dsn)
        .map_err(|e| AppError::Connection(format!("cannot open '{}': {}", dsn, e)))?;
    info!("Successfully opened connection to database.");

    let store = SqliteStore::from_connection(conn);
    store.ping()?;
    info!("Successfully pinged database.");

    store.create_schema()?;
    Ok(store)
}

impl SqliteStore {
    pub fn from_connection(conn: Connection) -> Self {
        SqliteStore { conn }
    }

    pub fn ping(&self) -> Result<(), AppError> {
        self.conn
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map(|_| ())
            .map_err(|e| AppError::Connection(format!("could not ping database: {}", e)))
    }

    pub fn create_schema(&self) -> Result<(), AppError> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn count_ticker(&self, ticker: &str) -> Result<i64, AppError> {
        let count = self.conn.query_row(
            "SELECT COUNT(1) FROM candles WHERE ticker = ?1",
            params![ticker],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// All stored candles for a ticker, oldest first.
    pub fn candles_for_ticker(&self, ticker: &str) -> Result<Vec<Candle>, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, ticker, date, open, high, low, close, volume
             FROM candles WHERE ticker = ?1 ORDER BY date",
        )?;
        let rows = stmt.query_map(params![ticker], |row| {
            Ok(Candle {
                id: row.get(0)?,
                ticker: row.get(1)?,
                date: row.get(2)?,
                open: row.get(3)?,
                high: row.get(4)?,
                low: row.get(5)?,
                close: row.get(6)?,
                volume: row.get(7)?,
            })
        })?;
        let mut candles = Vec::new();
        for c in rows {
            candles.push(c?);
        }
        Ok(candles)
    }
}

impl CandleStore for SqliteStore {
    fn ticker_exists(&self, ticker: &str) -> Result<bool, AppError> {
        Ok(self.count_ticker(ticker)? > 0)
    }

    fn insert_transaction(&mut self, statements: &[&[Candle]]) -> Result<(), AppError> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| AppError::Insert(format!("cannot begin transaction: {}", e)))?;

        for rows in statements.iter().filter(|rows| !rows.is_empty()) {
            let sql = insert_statement_sql(rows.len());
            let mut stmt = tx
                .prepare_cached(&sql)
                .map_err(|e| AppError::Insert(format!("cannot prepare insert: {}", e)))?;

            let mut values: Vec<&dyn ToSql> = Vec::with_capacity(rows.len() * PARAMS_PER_CANDLE);
            for c in rows.iter() {
                values.push(&c.id);
                values.push(&c.date);
                values.push(&c.ticker);
                values.push(&c.open);
                values.push(&c.high);
                values.push(&c.low);
                values.push(&c.close);
                values.push(&c.volume);
            }

            if let Err(e) = stmt.execute(params_from_iter(values)) {
                warn!("Insert of {} rows failed, rolling back transaction", rows.len());
                return Err(AppError::Insert(e.to_string()));
            }
        }

        tx.commit()
            .map_err(|e| AppError::Insert(format!("commit failed: {}", e)))?;
        debug!("Committed transaction with {} statements", statements.len());
        Ok(())
    }
}

/// `INSERT INTO candles (...) VALUES (?,...),(?,...)` for `rows` rows.
pub fn insert_statement_sql(rows: usize) -> String {
    let placeholder = format!("({})", vec!["?"; PARAMS_PER_CANDLE].join(","));
    let mut sql = String::from(
        "INSERT INTO candles (id, date, ticker, open, high, low, close, volume) VALUES ",
    );
    sql.push_str(&vec![placeholder; rows].join(","));
    sql
}
