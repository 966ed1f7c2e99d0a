use std::sync::Arc;

use super::config::ReportConfig;
use crate::domain::{
    DomainError, ExchangeRates, Order, RuleSet, SkipReason, User, Violation, parse_timestamp,
};
use crate::engine::{Outcome, Transform, TransformError};
use crate::io::{OrderCsvRecord, UserCsvRecord};

/// Validates a raw order row and normalizes it into a fact row
///
/// Rule violations, unparseable timestamps and failed currency conversions
/// skip the row. A rule naming a field the record does not have is a
/// configuration error and aborts the step.
pub struct OrderTransform {
    rules: RuleSet,
    timestamp_format: String,
    rates: Arc<dyn ExchangeRates>,
}

impl OrderTransform {
    pub fn new(config: &ReportConfig) -> Self {
        Self::with_rules(
            config.order_rules(),
            config.timestamp_format.clone(),
            config.rates.clone(),
        )
    }

    pub fn with_rules(
        rules: RuleSet,
        timestamp_format: impl Into<String>,
        rates: Arc<dyn ExchangeRates>,
    ) -> Self {
        Self {
            rules,
            timestamp_format: timestamp_format.into(),
            rates,
        }
    }
}

impl Transform<OrderCsvRecord, Order> for OrderTransform {
    fn apply(&self, record: OrderCsvRecord) -> Result<Outcome<Order>, TransformError> {
        if let Err(reason) = self.rules.check(&record) {
            if reason.violation == Violation::UnknownField {
                return Err(TransformError(format!(
                    "rule set references unknown field `{}`",
                    reason.field
                )));
            }
            return Ok(Outcome::Skip(reason));
        }

        let Some(order_datetime) = parse_timestamp(&record.order_datetime, &self.timestamp_format)
        else {
            return Ok(Outcome::Skip(SkipReason::new(
                "order_datetime",
                Violation::Unparseable(record.order_datetime),
            )));
        };

        let amount = match self
            .rates
            .convert(record.amount, &record.currency, order_datetime.date())
        {
            Ok(amount) => amount,
            Err(e) => {
                return Ok(Outcome::Skip(SkipReason::new(
                    "currency",
                    Violation::Conversion(e.to_string()),
                )));
            }
        };

        let order_id = record.order_id.unwrap_or_default();
        match Order::new(
            order_id,
            record.user_id,
            order_datetime,
            amount,
            record.item_count,
        ) {
            Ok(order) => Ok(Outcome::Keep(order)),
            Err(e) => Ok(Outcome::Skip(domain_skip(e))),
        }
    }
}

fn domain_skip(error: DomainError) -> SkipReason {
    match error {
        DomainError::MissingIdentity => SkipReason::new("order_id", Violation::Missing),
        DomainError::NonPositiveAmount(n) => SkipReason::new("amount", Violation::NotPositive(n)),
        DomainError::NonPositiveCount(n) => {
            SkipReason::new("item_count", Violation::NotPositive(n))
        }
        other => SkipReason::new("amount", Violation::Conversion(other.to_string())),
    }
}

/// Keeps users strictly older than the configured age
#[derive(Debug, Clone, Copy)]
pub struct UserTransform {
    min_age: i32,
}

impl UserTransform {
    pub fn new(min_age: i32) -> Self {
        Self { min_age }
    }
}

impl Transform<UserCsvRecord, User> for UserTransform {
    fn apply(&self, record: UserCsvRecord) -> Result<Outcome<User>, TransformError> {
        if record.age > self.min_age {
            Ok(Outcome::Keep(User::new(record.id, record.name, record.age)))
        } else {
            Ok(Outcome::Skip(SkipReason::new(
                "age",
                Violation::NotAllowed(record.age.to_string()),
            )))
        }
    }
}
