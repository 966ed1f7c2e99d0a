pub mod currency;
pub mod error;
pub mod order;
pub mod rules;
pub mod user;

// Re-export commonly used types
pub use currency::{DatedRateTable, ExchangeRates, FixedRateTable};
pub use error::DomainError;
pub use order::{Order, OrderDailySummary};
pub use rules::{FieldAccess, FieldValue, Rule, RuleSet, SkipReason, Violation, parse_timestamp};
pub use user::User;
