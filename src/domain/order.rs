use chrono::{NaiveDate, NaiveDateTime};

use super::error::DomainError;

/// Normalized order persisted in the fact table, keyed by `order_id`
///
/// `amount` is always expressed in the canonical currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    order_id: String,
    user_id: i64,
    order_datetime: NaiveDateTime,
    order_date: NaiveDate,
    amount: i64,
    item_count: i64,
}

impl Order {
    /// Create an order, enforcing the fact-table invariants
    pub fn new(
        order_id: impl Into<String>,
        user_id: i64,
        order_datetime: NaiveDateTime,
        amount: i64,
        item_count: i64,
    ) -> Result<Self, DomainError> {
        let order_id = order_id.into();
        if order_id.trim().is_empty() {
            return Err(DomainError::MissingIdentity);
        }
        if amount <= 0 {
            return Err(DomainError::NonPositiveAmount(amount));
        }
        if item_count <= 0 {
            return Err(DomainError::NonPositiveCount(item_count));
        }

        Ok(Self {
            order_id,
            user_id,
            order_datetime,
            order_date: order_datetime.date(),
            amount,
            item_count,
        })
    }

    /// Rebuild an order from stored columns without re-validating
    pub(crate) fn from_parts(
        order_id: String,
        user_id: i64,
        order_datetime: NaiveDateTime,
        order_date: NaiveDate,
        amount: i64,
        item_count: i64,
    ) -> Self {
        Self {
            order_id,
            user_id,
            order_datetime,
            order_date,
            amount,
            item_count,
        }
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn order_datetime(&self) -> NaiveDateTime {
        self.order_datetime
    }

    pub fn order_date(&self) -> NaiveDate {
        self.order_date
    }

    /// Amount in the canonical currency
    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn item_count(&self) -> i64 {
        self.item_count
    }
}

/// Daily aggregate keyed by calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderDailySummary {
    pub order_date: NaiveDate,
    pub total_amount: i64,
    pub total_order_count: i64,
    pub total_item_count: i64,
}

impl OrderDailySummary {
    pub fn new(
        order_date: NaiveDate,
        total_amount: i64,
        total_order_count: i64,
        total_item_count: i64,
    ) -> Self {
        Self {
            order_date,
            total_amount,
            total_order_count,
            total_item_count,
        }
    }

    /// Single-order contribution, order count fixed at 1
    pub fn from_order(order: &Order) -> Self {
        Self::new(order.order_date(), order.amount(), 1, order.item_count())
    }

    /// Add another summary's totals onto this one (same date expected)
    pub fn merge(&self, other: &Self) -> Result<Self, DomainError> {
        Ok(Self {
            order_date: self.order_date,
            total_amount: self
                .total_amount
                .checked_add(other.total_amount)
                .ok_or(DomainError::Overflow)?,
            total_order_count: self
                .total_order_count
                .checked_add(other.total_order_count)
                .ok_or(DomainError::Overflow)?,
            total_item_count: self
                .total_item_count
                .checked_add(other.total_item_count)
                .ok_or(DomainError::Overflow)?,
        })
    }
}
