use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;

use super::aggregate::SummaryPolicy;
use crate::domain::{ExchangeRates, FixedRateTable, Rule, RuleSet};

/// Knobs of the order report pipeline
///
/// `Default` reproduces the production settings: chunks of 2 for imports, 1
/// for the summary, KRW as the canonical currency and USD at 1300.
#[derive(Clone)]
pub struct ReportConfig {
    /// Directory holding `orders_<date>.csv` and `users.csv`
    pub input_dir: PathBuf,
    pub import_chunk_size: usize,
    pub summary_chunk_size: usize,
    pub user_chunk_size: usize,
    /// `chrono` format of `order_datetime`
    pub timestamp_format: String,
    pub accepted_status: String,
    pub allowed_currencies: Vec<String>,
    pub rates: Arc<dyn ExchangeRates>,
    pub summary_policy: SummaryPolicy,
    /// Users must be strictly older than this
    pub min_user_age: i32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            import_chunk_size: 2,
            summary_chunk_size: 1,
            user_chunk_size: 2,
            timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
            accepted_status: "PAID".to_string(),
            allowed_currencies: vec!["KRW".to_string(), "USD".to_string()],
            rates: Arc::new(FixedRateTable::new("KRW").with_rate("USD", 1300)),
            summary_policy: SummaryPolicy::default(),
            min_user_age: 18,
        }
    }
}

impl fmt::Debug for ReportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportConfig")
            .field("input_dir", &self.input_dir)
            .field("import_chunk_size", &self.import_chunk_size)
            .field("summary_chunk_size", &self.summary_chunk_size)
            .field("user_chunk_size", &self.user_chunk_size)
            .field("timestamp_format", &self.timestamp_format)
            .field("accepted_status", &self.accepted_status)
            .field("allowed_currencies", &self.allowed_currencies)
            .field("canonical_currency", &self.rates.canonical_currency())
            .field("summary_policy", &self.summary_policy)
            .field("min_user_age", &self.min_user_age)
            .finish_non_exhaustive()
    }
}

impl ReportConfig {
    /// Validation rules applied to every raw order row, in evaluation order
    pub fn order_rules(&self) -> RuleSet {
        RuleSet::new()
            .field("order_id", Rule::Required)
            .field("status", Rule::OneOf(vec![self.accepted_status.clone()]))
            .field("amount", Rule::Positive)
            .field("item_count", Rule::Positive)
            .field("currency", Rule::OneOf(self.allowed_currencies.clone()))
            .field(
                "order_datetime",
                Rule::Timestamp(self.timestamp_format.clone()),
            )
    }

    /// Input file for one date partition
    pub fn orders_file(&self, date: NaiveDate) -> PathBuf {
        self.input_dir
            .join(format!("orders_{}.csv", date.format("%Y-%m-%d")))
    }

    pub fn users_file(&self) -> PathBuf {
        self.input_dir.join("users.csv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_settings() {
        let config = ReportConfig::default();
        assert_eq!(config.import_chunk_size, 2);
        assert_eq!(config.summary_chunk_size, 1);
        assert_eq!(config.user_chunk_size, 2);
        assert_eq!(config.rates.canonical_currency(), "KRW");
        assert_eq!(
            config
                .rates
                .rate("USD", NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
            Some(1300)
        );
        assert_eq!(config.summary_policy, SummaryPolicy::Recompute);
        assert_eq!(config.order_rules().len(), 6);
    }

    #[test]
    fn orders_file_is_named_after_partition() {
        let config = ReportConfig {
            input_dir: PathBuf::from("/data"),
            ..ReportConfig::default()
        };
        let date = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
        assert_eq!(
            config.orders_file(date),
            PathBuf::from("/data/orders_2025-01-03.csv")
        );
        assert_eq!(config.users_file(), PathBuf::from("/data/users.csv"));
    }
}
