use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use dashmap::DashMap;
use tracing::debug;

use super::error::StorageError;
use super::traits::{Store, StoreTransaction};
use crate::domain::{Order, OrderDailySummary, User};

/// In-memory store backed by DashMap tables
///
/// A single gate serializes transactions and reads, so a reader never sees a
/// half-applied commit. Reading while holding an open transaction on the
/// same thread blocks.
pub struct MemoryStore {
    orders: DashMap<String, Order>,
    summaries: DashMap<NaiveDate, OrderDailySummary>,
    users: DashMap<i64, User>,
    gate: Mutex<()>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            orders: DashMap::new(),
            summaries: DashMap::new(),
            users: DashMap::new(),
            gate: Mutex::new(()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, StorageError> {
        self.gate.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Staged writes applied to the tables only on commit
pub struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    _gate: MutexGuard<'a, ()>,
    orders: HashMap<String, Order>,
    summaries: HashMap<NaiveDate, OrderDailySummary>,
    users: HashMap<i64, User>,
    committed: bool,
}

impl MemoryTransaction<'_> {
    fn current_summary(&self, date: NaiveDate) -> Option<OrderDailySummary> {
        self.summaries
            .get(&date)
            .copied()
            .or_else(|| self.store.summaries.get(&date).map(|r| *r.value()))
    }
}

fn check_order(order: &Order) -> Result<(), StorageError> {
    if order.order_id().is_empty() {
        return Err(StorageError::ConstraintViolation(
            "order_tx.order_id must not be empty".to_string(),
        ));
    }
    if order.amount() <= 0 {
        return Err(StorageError::ConstraintViolation(format!(
            "order_tx.amount > 0 failed for {}",
            order.order_id()
        )));
    }
    if order.item_count() <= 0 {
        return Err(StorageError::ConstraintViolation(format!(
            "order_tx.item_count > 0 failed for {}",
            order.order_id()
        )));
    }
    Ok(())
}

fn check_summary(row: &OrderDailySummary) -> Result<(), StorageError> {
    if row.total_amount < 0 || row.total_order_count < 0 || row.total_item_count < 0 {
        return Err(StorageError::ConstraintViolation(format!(
            "order_daily_summary totals must be non-negative for {}",
            row.order_date
        )));
    }
    Ok(())
}

impl StoreTransaction for MemoryTransaction<'_> {
    fn upsert_orders(&mut self, orders: &[Order]) -> Result<(), StorageError> {
        for order in orders {
            check_order(order)?;
            self.orders
                .insert(order.order_id().to_string(), order.clone());
        }
        Ok(())
    }

    fn replace_summaries(&mut self, rows: &[OrderDailySummary]) -> Result<(), StorageError> {
        for row in rows {
            check_summary(row)?;
            self.summaries.insert(row.order_date, *row);
        }
        Ok(())
    }

    fn accumulate_summaries(&mut self, rows: &[OrderDailySummary]) -> Result<(), StorageError> {
        for row in rows {
            check_summary(row)?;
            let next = match self.current_summary(row.order_date) {
                Some(existing) => existing.merge(row)?,
                None => *row,
            };
            self.summaries.insert(row.order_date, next);
        }
        Ok(())
    }

    fn insert_users(&mut self, users: &[User]) -> Result<(), StorageError> {
        for user in users {
            if self.users.contains_key(&user.id) || self.store.users.contains_key(&user.id) {
                return Err(StorageError::DuplicateKey(format!("user_info.id={}", user.id)));
            }
            self.users.insert(user.id, user.clone());
        }
        Ok(())
    }

    fn commit(mut self) -> Result<(), StorageError> {
        for (key, order) in std::mem::take(&mut self.orders) {
            self.store.orders.insert(key, order);
        }
        for (key, row) in std::mem::take(&mut self.summaries) {
            self.store.summaries.insert(key, row);
        }
        for (key, user) in std::mem::take(&mut self.users) {
            self.store.users.insert(key, user);
        }
        self.committed = true;
        Ok(())
    }
}

impl Drop for MemoryTransaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            debug!(
                staged_orders = self.orders.len(),
                staged_summaries = self.summaries.len(),
                staged_users = self.users.len(),
                "Rolling back memory transaction"
            );
        }
    }
}

impl Store for MemoryStore {
    type Transaction<'a>
        = MemoryTransaction<'a>
    where
        Self: 'a;

    fn begin(&self) -> Result<Self::Transaction<'_>, StorageError> {
        Ok(MemoryTransaction {
            store: self,
            _gate: self.lock()?,
            orders: HashMap::new(),
            summaries: HashMap::new(),
            users: HashMap::new(),
            committed: false,
        })
    }

    fn order(&self, order_id: &str) -> Result<Option<Order>, StorageError> {
        let _gate = self.lock()?;
        Ok(self.orders.get(order_id).map(|r| r.value().clone()))
    }

    fn orders(&self) -> Result<Vec<Order>, StorageError> {
        let _gate = self.lock()?;
        let mut orders: Vec<Order> = self.orders.iter().map(|r| r.value().clone()).collect();
        orders.sort_by(|a, b| a.order_id().cmp(b.order_id()));
        Ok(orders)
    }

    fn orders_on(&self, date: NaiveDate) -> Result<Vec<Order>, StorageError> {
        Ok(self
            .orders()?
            .into_iter()
            .filter(|o| o.order_date() == date)
            .collect())
    }

    fn daily_totals(&self, date: NaiveDate) -> Result<Option<OrderDailySummary>, StorageError> {
        let mut totals: Option<OrderDailySummary> = None;
        for order in self.orders_on(date)? {
            let row = OrderDailySummary::from_order(&order);
            totals = Some(match totals {
                Some(acc) => acc.merge(&row)?,
                None => row,
            });
        }
        Ok(totals)
    }

    fn summary(&self, date: NaiveDate) -> Result<Option<OrderDailySummary>, StorageError> {
        let _gate = self.lock()?;
        Ok(self.summaries.get(&date).map(|r| *r.value()))
    }

    fn summaries(&self) -> Result<Vec<OrderDailySummary>, StorageError> {
        let _gate = self.lock()?;
        let mut rows: Vec<OrderDailySummary> = self.summaries.iter().map(|r| *r.value()).collect();
        rows.sort_by_key(|r| r.order_date);
        Ok(rows)
    }

    fn users(&self) -> Result<Vec<User>, StorageError> {
        let _gate = self.lock()?;
        let mut users: Vec<User> = self.users.iter().map(|r| r.value().clone()).collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn order(id: &str, day: u32, amount: i64, items: i64) -> Order {
        let at = NaiveDateTime::parse_from_str(
            &format!("2025-01-{:02} 09:00:00", day),
            "%Y-%m-%d %H:%M:%S",
        )
        .unwrap();
        Order::new(id, 1, at, amount, items).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn committed_writes_are_visible() {
        let store = MemoryStore::new();
        let mut tx = store.begin().unwrap();
        tx.upsert_orders(&[order("A", 1, 100, 1)]).unwrap();
        tx.commit().unwrap();

        assert_eq!(store.order("A").unwrap().unwrap().amount(), 100);
    }

    #[test]
    fn dropped_transaction_rolls_back() {
        let store = MemoryStore::new();
        {
            let mut tx = store.begin().unwrap();
            tx.upsert_orders(&[order("A", 1, 100, 1)]).unwrap();
        }

        assert!(store.orders().unwrap().is_empty());
    }

    #[test]
    fn upsert_replaces_non_key_columns() {
        let store = MemoryStore::new();
        for amount in [100, 250] {
            let mut tx = store.begin().unwrap();
            tx.upsert_orders(&[order("A", 1, amount, 1)]).unwrap();
            tx.commit().unwrap();
        }

        let orders = store.orders().unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].amount(), 250);
    }

    #[test]
    fn accumulate_adds_to_existing_totals() {
        let store = MemoryStore::new();
        for _ in 0..2 {
            let mut tx = store.begin().unwrap();
            tx.accumulate_summaries(&[OrderDailySummary::new(date(1), 100, 1, 2)])
                .unwrap();
            tx.commit().unwrap();
        }

        assert_eq!(
            store.summary(date(1)).unwrap(),
            Some(OrderDailySummary::new(date(1), 200, 2, 4))
        );
    }

    #[test]
    fn accumulate_within_one_transaction_sees_staged_rows() {
        let store = MemoryStore::new();
        let mut tx = store.begin().unwrap();
        tx.accumulate_summaries(&[
            OrderDailySummary::new(date(1), 100, 1, 2),
            OrderDailySummary::new(date(1), 50, 1, 1),
        ])
        .unwrap();
        tx.commit().unwrap();

        assert_eq!(
            store.summary(date(1)).unwrap(),
            Some(OrderDailySummary::new(date(1), 150, 2, 3))
        );
    }

    #[test]
    fn replace_overwrites_totals() {
        let store = MemoryStore::new();
        for _ in 0..2 {
            let mut tx = store.begin().unwrap();
            tx.replace_summaries(&[OrderDailySummary::new(date(1), 100, 1, 2)])
                .unwrap();
            tx.commit().unwrap();
        }

        assert_eq!(
            store.summaries().unwrap(),
            vec![OrderDailySummary::new(date(1), 100, 1, 2)]
        );
    }

    #[test]
    fn constraint_violation_rejects_invalid_order() {
        let store = MemoryStore::new();
        let bad = Order::from_parts(
            "B".to_string(),
            1,
            order("x", 1, 1, 1).order_datetime(),
            date(1),
            0,
            1,
        );
        let mut tx = store.begin().unwrap();
        let result = tx.upsert_orders(&[order("A", 1, 100, 1), bad]);
        assert!(matches!(result, Err(StorageError::ConstraintViolation(_))));
    }

    #[test]
    fn duplicate_user_is_rejected() {
        let store = MemoryStore::new();
        let mut tx = store.begin().unwrap();
        tx.insert_users(&[User::new(1, "kim", 20)]).unwrap();
        tx.commit().unwrap();

        let mut tx = store.begin().unwrap();
        let result = tx.insert_users(&[User::new(1, "kim", 20)]);
        assert!(matches!(result, Err(StorageError::DuplicateKey(_))));
    }

    #[test]
    fn daily_totals_groups_by_date() {
        let store = MemoryStore::new();
        let mut tx = store.begin().unwrap();
        tx.upsert_orders(&[
            order("A", 1, 100, 2),
            order("B", 1, 300, 1),
            order("C", 2, 999, 9),
        ])
        .unwrap();
        tx.commit().unwrap();

        assert_eq!(
            store.daily_totals(date(1)).unwrap(),
            Some(OrderDailySummary::new(date(1), 400, 2, 3))
        );
        assert_eq!(store.daily_totals(date(3)).unwrap(), None);
        assert_eq!(store.orders_on(date(2)).unwrap().len(), 1);
    }
}
