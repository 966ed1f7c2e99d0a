use crate::storage::{StorageError, StoreTransaction};

/// Persists one chunk inside a transaction owned by the engine
///
/// Any row failure must be returned so the engine rolls back the whole chunk.
pub trait ChunkWriter<T>: Send + Sync {
    fn write<X: StoreTransaction>(&self, tx: &mut X, chunk: &[T]) -> Result<(), StorageError>;
}
