use thiserror::Error;

use crate::io::IoError;
use crate::job::ParameterError;
use crate::storage::StorageError;

/// Fatal failure raised by a transform (distinct from a skip)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransformError(pub String);

/// Engine-level errors that terminate a step
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Cannot open source: {0}")]
    SourceOpen(#[source] IoError),

    #[error("Source read failed at record {offset}: {source}")]
    SourceRead { offset: u64, source: IoError },

    #[error("Transform failed at record {offset}: {source}")]
    Transform { offset: u64, source: TransformError },

    #[error("Chunk {chunk} write failed after committed offset {committed_offset}: {source}")]
    ChunkWrite {
        chunk: u64,
        committed_offset: u64,
        source: StorageError,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        assert_eq!(
            EngineError::Configuration("chunk size must be positive".to_string()).to_string(),
            "Configuration error: chunk size must be positive"
        );
        assert_eq!(
            EngineError::Transform {
                offset: 4,
                source: TransformError("bad rule".to_string()),
            }
            .to_string(),
            "Transform failed at record 4: bad rule"
        );
        assert_eq!(
            EngineError::ChunkWrite {
                chunk: 3,
                committed_offset: 4,
                source: StorageError::LockPoisoned,
            }
            .to_string(),
            "Chunk 3 write failed after committed offset 4: Store lock poisoned"
        );
    }

    #[test]
    fn parameter_error_conversion() {
        let err = EngineError::from(ParameterError::Missing("targetDate".to_string()));

        match err {
            EngineError::Parameter(ParameterError::Missing(key)) => assert_eq!(key, "targetDate"),
            _ => panic!("Expected Parameter error variant"),
        }
    }

    #[test]
    fn storage_error_conversion() {
        let err = EngineError::from(StorageError::LockPoisoned);

        match err {
            EngineError::Storage(StorageError::LockPoisoned) => {}
            _ => panic!("Expected Storage error variant"),
        }
    }
}
