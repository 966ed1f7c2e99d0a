use serde::Deserialize;

use crate::domain::{FieldAccess, FieldValue};

/// Raw order row as read from `orders_<date>.csv`
///
/// Typed coercion happens at read time: a non-numeric `user_id`, `amount` or
/// `item_count` fails the read. An empty `order_id` becomes `None`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderCsvRecord {
    pub order_id: Option<String>,
    pub user_id: i64,
    pub order_datetime: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub item_count: i64,
}

impl FieldAccess for OrderCsvRecord {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "order_id" => self
                .order_id
                .as_deref()
                .map_or(FieldValue::Null, FieldValue::Text),
            "user_id" => FieldValue::Integer(self.user_id),
            "order_datetime" => FieldValue::Text(&self.order_datetime),
            "amount" => FieldValue::Integer(self.amount),
            "currency" => FieldValue::Text(&self.currency),
            "status" => FieldValue::Text(&self.status),
            "item_count" => FieldValue::Integer(self.item_count),
            _ => return None,
        };
        Some(value)
    }
}

/// Raw user row as read from `users.csv`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserCsvRecord {
    pub id: i64,
    pub name: String,
    pub age: i32,
}

impl FieldAccess for UserCsvRecord {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "id" => FieldValue::Integer(self.id),
            "name" => FieldValue::Text(&self.name),
            "age" => FieldValue::Integer(i64::from(self.age)),
            _ => return None,
        };
        Some(value)
    }
}
