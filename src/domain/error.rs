use thiserror::Error;

/// Domain-level errors representing business rule violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Missing identity key")]
    MissingIdentity,

    #[error("Amount must be positive: {0}")]
    NonPositiveAmount(i64),

    #[error("Item count must be positive: {0}")]
    NonPositiveCount(i64),

    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Arithmetic overflow")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        assert_eq!(
            DomainError::MissingIdentity.to_string(),
            "Missing identity key"
        );
        assert_eq!(
            DomainError::NonPositiveAmount(0).to_string(),
            "Amount must be positive: 0"
        );
        assert_eq!(
            DomainError::NonPositiveCount(-1).to_string(),
            "Item count must be positive: -1"
        );
        assert_eq!(
            DomainError::UnsupportedCurrency("EUR".to_string()).to_string(),
            "Unsupported currency: EUR"
        );
        assert_eq!(DomainError::Overflow.to_string(), "Arithmetic overflow");
    }

    #[test]
    fn error_comparison_works() {
        assert_eq!(DomainError::Overflow, DomainError::Overflow);
        assert_ne!(DomainError::Overflow, DomainError::MissingIdentity);
    }
}
