use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;

use super::error::DomainError;

/// Rate table used to normalize amounts into the canonical currency
///
/// Rates are integral multipliers: `canonical = amount * rate`.
pub trait ExchangeRates: Send + Sync {
    /// Currency every amount is normalized to
    fn canonical_currency(&self) -> &str;

    /// Rate for `currency` effective on `on`, if one is declared
    fn rate(&self, currency: &str, on: NaiveDate) -> Option<i64>;

    /// Convert `amount` in `currency` to the canonical currency
    ///
    /// The canonical currency always converts to itself.
    fn convert(&self, amount: i64, currency: &str, on: NaiveDate) -> Result<i64, DomainError> {
        if currency == self.canonical_currency() {
            return Ok(amount);
        }

        let rate = self
            .rate(currency, on)
            .ok_or_else(|| DomainError::UnsupportedCurrency(currency.to_string()))?;

        amount.checked_mul(rate).ok_or(DomainError::Overflow)
    }
}

impl<R: ExchangeRates + ?Sized> ExchangeRates for Arc<R> {
    fn canonical_currency(&self) -> &str {
        (**self).canonical_currency()
    }

    fn rate(&self, currency: &str, on: NaiveDate) -> Option<i64> {
        (**self).rate(currency, on)
    }
}

/// One constant rate per currency, independent of date
#[derive(Debug, Clone)]
pub struct FixedRateTable {
    canonical: String,
    rates: HashMap<String, i64>,
}

impl FixedRateTable {
    pub fn new(canonical: impl Into<String>) -> Self {
        Self {
            canonical: canonical.into(),
            rates: HashMap::new(),
        }
    }

    pub fn with_rate(mut self, currency: impl Into<String>, rate: i64) -> Self {
        self.rates.insert(currency.into(), rate);
        self
    }

    pub fn currencies(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }
}

impl ExchangeRates for FixedRateTable {
    fn canonical_currency(&self) -> &str {
        &self.canonical
    }

    fn rate(&self, currency: &str, _on: NaiveDate) -> Option<i64> {
        self.rates.get(currency).copied()
    }
}

/// Rates that change over time; each rate applies from its effective date
/// until the next one for the same currency
#[derive(Debug, Clone)]
pub struct DatedRateTable {
    canonical: String,
    rates: HashMap<String, BTreeMap<NaiveDate, i64>>,
}

impl DatedRateTable {
    pub fn new(canonical: impl Into<String>) -> Self {
        Self {
            canonical: canonical.into(),
            rates: HashMap::new(),
        }
    }

    pub fn with_rate_from(
        mut self,
        currency: impl Into<String>,
        effective: NaiveDate,
        rate: i64,
    ) -> Self {
        self.rates
            .entry(currency.into())
            .or_default()
            .insert(effective, rate);
        self
    }
}

impl ExchangeRates for DatedRateTable {
    fn canonical_currency(&self) -> &str {
        &self.canonical
    }

    fn rate(&self, currency: &str, on: NaiveDate) -> Option<i64> {
        self.rates
            .get(currency)?
            .range(..=on)
            .next_back()
            .map(|(_, rate)| *rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn canonical_currency_is_identity() {
        let table = FixedRateTable::new("KRW").with_rate("USD", 1300);
        assert_eq!(table.convert(100, "KRW", day(1)).unwrap(), 100);
    }

    #[test]
    fn foreign_currency_multiplies_by_rate() {
        let table = FixedRateTable::new("KRW").with_rate("USD", 1300);
        assert_eq!(table.convert(10, "USD", day(1)).unwrap(), 13_000);
    }

    #[test]
    fn unknown_currency_is_rejected() {
        let table = FixedRateTable::new("KRW").with_rate("USD", 1300);
        assert_eq!(
            table.convert(10, "EUR", day(1)),
            Err(DomainError::UnsupportedCurrency("EUR".to_string()))
        );
    }

    #[test]
    fn conversion_overflow_is_reported() {
        let table = FixedRateTable::new("KRW").with_rate("USD", 1300);
        assert_eq!(
            table.convert(i64::MAX, "USD", day(1)),
            Err(DomainError::Overflow)
        );
    }

    #[test]
    fn dated_table_uses_latest_effective_rate() {
        let table = DatedRateTable::new("KRW")
            .with_rate_from("USD", day(1), 1300)
            .with_rate_from("USD", day(10), 1350);

        assert_eq!(table.rate("USD", day(5)), Some(1300));
        assert_eq!(table.rate("USD", day(10)), Some(1350));
        assert_eq!(table.rate("USD", day(31)), Some(1350));
    }

    #[test]
    fn dated_table_has_no_rate_before_first_effective_date() {
        let table = DatedRateTable::new("KRW").with_rate_from("USD", day(10), 1350);
        assert_eq!(table.rate("USD", day(9)), None);
        assert!(table.convert(1, "USD", day(9)).is_err());
    }

    #[test]
    fn shared_table_delegates() {
        let table: Arc<dyn ExchangeRates> =
            Arc::new(FixedRateTable::new("KRW").with_rate("USD", 1300));
        assert_eq!(table.convert(2, "USD", day(1)).unwrap(), 2_600);
    }

    proptest! {
        #[test]
        fn conversion_is_deterministic(amount in 1i64..1_000_000, rate in 1i64..10_000) {
            let table = FixedRateTable::new("KRW").with_rate("USD", rate);
            let first = table.convert(amount, "USD", day(1)).unwrap();
            let second = table.convert(amount, "USD", day(1)).unwrap();
            prop_assert_eq!(first, second);
            prop_assert_eq!(first, amount * rate);
        }

        #[test]
        fn canonical_conversion_never_changes_amount(amount in any::<i64>()) {
            let table = FixedRateTable::new("KRW").with_rate("USD", 1300);
            prop_assert_eq!(table.convert(amount, "KRW", day(1)).unwrap(), amount);
        }
    }
}
