pub mod error;
pub mod memory;
pub mod sqlite;
pub mod traits;

// Re-export commonly used types
pub use error::StorageError;
pub use memory::{MemoryStore, MemoryTransaction};
pub use sqlite::{SqliteStore, SqliteTransaction};
pub use traits::{Store, StoreTransaction};
