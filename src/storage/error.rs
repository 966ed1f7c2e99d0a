use thiserror::Error;

use crate::domain::DomainError;

/// Storage-level errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("Domain error: {0}")]
    DomainError(#[from] DomainError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        assert_eq!(
            StorageError::ConstraintViolation("amount > 0".to_string()).to_string(),
            "Constraint violation: amount > 0"
        );
        assert_eq!(
            StorageError::DuplicateKey("user_info.id=1".to_string()).to_string(),
            "Duplicate key: user_info.id=1"
        );
        assert_eq!(StorageError::LockPoisoned.to_string(), "Store lock poisoned");
    }

    #[test]
    fn domain_error_conversion() {
        let storage_err = StorageError::from(DomainError::Overflow);

        match storage_err {
            StorageError::DomainError(DomainError::Overflow) => {}
            _ => panic!("Expected DomainError variant"),
        }
    }
}
