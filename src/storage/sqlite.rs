use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use tracing::{debug, warn};

use super::error::StorageError;
use super::traits::{Store, StoreTransaction};
use crate::domain::{Order, OrderDailySummary, User};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS order_tx (
    order_id        TEXT    PRIMARY KEY NOT NULL CHECK (length(order_id) > 0),
    user_id         INTEGER NOT NULL,
    order_datetime  TEXT    NOT NULL,
    order_date      TEXT    NOT NULL,
    amount          INTEGER NOT NULL CHECK (amount > 0),
    item_count      INTEGER NOT NULL CHECK (item_count > 0)
);
CREATE INDEX IF NOT EXISTS idx_order_tx_order_date ON order_tx(order_date);

CREATE TABLE IF NOT EXISTS order_daily_summary (
    order_date          TEXT    PRIMARY KEY NOT NULL,
    total_amount        INTEGER NOT NULL CHECK (total_amount >= 0),
    total_order_count   INTEGER NOT NULL CHECK (total_order_count >= 0),
    total_item_count    INTEGER NOT NULL CHECK (total_item_count >= 0)
);

CREATE TABLE IF NOT EXISTS user_info (
    id      INTEGER PRIMARY KEY NOT NULL,
    name    TEXT    NOT NULL,
    age     INTEGER NOT NULL
);
";

const UPSERT_ORDER: &str = "
INSERT INTO order_tx (order_id, user_id, order_datetime, order_date, amount, item_count)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
ON CONFLICT(order_id) DO UPDATE SET
    user_id = excluded.user_id,
    order_datetime = excluded.order_datetime,
    order_date = excluded.order_date,
    amount = excluded.amount,
    item_count = excluded.item_count
";

const REPLACE_SUMMARY: &str = "
INSERT INTO order_daily_summary (order_date, total_amount, total_order_count, total_item_count)
VALUES (?1, ?2, ?3, ?4)
ON CONFLICT(order_date) DO UPDATE SET
    total_amount = excluded.total_amount,
    total_order_count = excluded.total_order_count,
    total_item_count = excluded.total_item_count
";

const ACCUMULATE_SUMMARY: &str = "
INSERT INTO order_daily_summary (order_date, total_amount, total_order_count, total_item_count)
VALUES (?1, ?2, ?3, ?4)
ON CONFLICT(order_date) DO UPDATE SET
    total_amount = order_daily_summary.total_amount + excluded.total_amount,
    total_order_count = order_daily_summary.total_order_count + excluded.total_order_count,
    total_item_count = order_daily_summary.total_item_count + excluded.total_item_count
";

const INSERT_USER: &str = "INSERT INTO user_info (id, name, age) VALUES (?1, ?2, ?3)";

const SELECT_ORDERS: &str = "
SELECT order_id, user_id, order_datetime, order_date, amount, item_count FROM order_tx";

/// SQLite-backed store with the fact, summary and user tables
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Private in-memory database
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

/// Translate SQLite constraint failures into storage errors
fn classify(err: rusqlite::Error) -> StorageError {
    match &err {
        rusqlite::Error::SqliteFailure(e, msg) if e.code == ErrorCode::ConstraintViolation => {
            let detail = msg.clone().unwrap_or_else(|| e.to_string());
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            {
                StorageError::DuplicateKey(detail)
            } else {
                StorageError::ConstraintViolation(detail)
            }
        }
        _ => StorageError::Database(err),
    }
}

fn order_from_row(row: &Row<'_>) -> rusqlite::Result<Order> {
    Ok(Order::from_parts(
        row.get(0)?,
        row.get(1)?,
        row.get::<_, NaiveDateTime>(2)?,
        row.get::<_, NaiveDate>(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<OrderDailySummary> {
    Ok(OrderDailySummary::new(
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
    ))
}

/// Explicit BEGIN/COMMIT scope over the locked connection
pub struct SqliteTransaction<'a> {
    conn: MutexGuard<'a, Connection>,
    finished: bool,
}

impl SqliteTransaction<'_> {
    fn write_summaries(&mut self, sql: &str, rows: &[OrderDailySummary]) -> Result<(), StorageError> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        for row in rows {
            stmt.execute(params![
                row.order_date,
                row.total_amount,
                row.total_order_count,
                row.total_item_count
            ])
            .map_err(classify)?;
        }
        Ok(())
    }
}

impl StoreTransaction for SqliteTransaction<'_> {
    fn upsert_orders(&mut self, orders: &[Order]) -> Result<(), StorageError> {
        let mut stmt = self.conn.prepare_cached(UPSERT_ORDER)?;
        for order in orders {
            stmt.execute(params![
                order.order_id(),
                order.user_id(),
                order.order_datetime(),
                order.order_date(),
                order.amount(),
                order.item_count()
            ])
            .map_err(classify)?;
        }
        Ok(())
    }

    fn replace_summaries(&mut self, rows: &[OrderDailySummary]) -> Result<(), StorageError> {
        self.write_summaries(REPLACE_SUMMARY, rows)
    }

    fn accumulate_summaries(&mut self, rows: &[OrderDailySummary]) -> Result<(), StorageError> {
        self.write_summaries(ACCUMULATE_SUMMARY, rows)
    }

    fn insert_users(&mut self, users: &[User]) -> Result<(), StorageError> {
        let mut stmt = self.conn.prepare_cached(INSERT_USER)?;
        for user in users {
            stmt.execute(params![user.id, user.name, user.age])
                .map_err(classify)?;
        }
        Ok(())
    }

    fn commit(mut self) -> Result<(), StorageError> {
        self.conn.execute_batch("COMMIT")?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        debug!("Rolling back sqlite transaction");
        if let Err(e) = self.conn.execute_batch("ROLLBACK") {
            warn!(error = %e, "Rollback failed");
        }
    }
}

impl Store for SqliteStore {
    type Transaction<'a>
        = SqliteTransaction<'a>
    where
        Self: 'a;

    fn begin(&self) -> Result<Self::Transaction<'_>, StorageError> {
        let conn = self.lock()?;
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(SqliteTransaction {
            conn,
            finished: false,
        })
    }

    fn order(&self, order_id: &str) -> Result<Option<Order>, StorageError> {
        let conn = self.lock()?;
        let order = conn
            .query_row(
                &format!("{} WHERE order_id = ?1", SELECT_ORDERS),
                params![order_id],
                order_from_row,
            )
            .optional()?;
        Ok(order)
    }

    fn orders(&self) -> Result<Vec<Order>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY order_id", SELECT_ORDERS))?;
        let orders = stmt
            .query_map([], order_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(orders)
    }

    fn orders_on(&self, date: NaiveDate) -> Result<Vec<Order>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE order_date = ?1 ORDER BY order_id",
            SELECT_ORDERS
        ))?;
        let orders = stmt
            .query_map(params![date], order_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(orders)
    }

    fn daily_totals(&self, date: NaiveDate) -> Result<Option<OrderDailySummary>, StorageError> {
        let conn = self.lock()?;
        let totals = conn
            .query_row(
                "SELECT order_date, SUM(amount), COUNT(order_id), SUM(item_count)
                 FROM order_tx
                 WHERE order_date = ?1
                 GROUP BY order_date",
                params![date],
                summary_from_row,
            )
            .optional()?;
        Ok(totals)
    }

    fn summary(&self, date: NaiveDate) -> Result<Option<OrderDailySummary>, StorageError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT order_date, total_amount, total_order_count, total_item_count
                 FROM order_daily_summary WHERE order_date = ?1",
                params![date],
                summary_from_row,
            )
            .optional()?;
        Ok(row)
    }

    fn summaries(&self) -> Result<Vec<OrderDailySummary>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT order_date, total_amount, total_order_count, total_item_count
             FROM order_daily_summary ORDER BY order_date",
        )?;
        let rows = stmt
            .query_map([], summary_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn users(&self) -> Result<Vec<User>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, name, age FROM user_info ORDER BY id")?;
        let users = stmt
            .query_map([], |row| Ok(User::new(row.get(0)?, row.get::<_, String>(1)?, row.get(2)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }
}
