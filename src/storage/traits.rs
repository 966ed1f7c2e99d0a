use chrono::NaiveDate;

use super::error::StorageError;
use crate::domain::{Order, OrderDailySummary, User};

/// Transactional record sink with committed-data reads
///
/// Reads only ever observe committed transactions.
pub trait Store: Send + Sync {
    type Transaction<'a>: StoreTransaction
    where
        Self: 'a;

    /// Open a transaction; it holds the store's write connection exclusively
    /// until it is committed or dropped (dropping rolls back)
    fn begin(&self) -> Result<Self::Transaction<'_>, StorageError>;

    /// Fact row by identity key
    fn order(&self, order_id: &str) -> Result<Option<Order>, StorageError>;

    /// All fact rows ordered by identity key
    fn orders(&self) -> Result<Vec<Order>, StorageError>;

    /// Fact rows for one calendar date ordered by identity key
    fn orders_on(&self, date: NaiveDate) -> Result<Vec<Order>, StorageError>;

    /// Grouping query over the fact table for one date
    fn daily_totals(&self, date: NaiveDate) -> Result<Option<OrderDailySummary>, StorageError>;

    /// Stored summary row for one date
    fn summary(&self, date: NaiveDate) -> Result<Option<OrderDailySummary>, StorageError>;

    /// All summary rows ordered by date
    fn summaries(&self) -> Result<Vec<OrderDailySummary>, StorageError>;

    /// All users ordered by id
    fn users(&self) -> Result<Vec<User>, StorageError>;
}

/// Unit of work scoped to one chunk
pub trait StoreTransaction {
    /// Insert or overwrite every non-key column by `order_id`
    fn upsert_orders(&mut self, orders: &[Order]) -> Result<(), StorageError>;

    /// Insert or overwrite totals by `order_date`
    fn replace_summaries(&mut self, rows: &[OrderDailySummary]) -> Result<(), StorageError>;

    /// Insert, or add incoming totals onto stored totals, by `order_date`
    fn accumulate_summaries(&mut self, rows: &[OrderDailySummary]) -> Result<(), StorageError>;

    /// Plain insert; an existing id is a [`StorageError::DuplicateKey`]
    fn insert_users(&mut self, users: &[User]) -> Result<(), StorageError>;

    /// Make every write of this transaction visible at once
    fn commit(self) -> Result<(), StorageError>;
}
