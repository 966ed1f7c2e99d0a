pub mod chunk;
pub mod error;
pub mod listener;
pub mod result;
pub mod transform;
pub mod writer;

// Re-export commonly used types
pub use chunk::ChunkEngine;
pub use error::{EngineError, TransformError};
pub use listener::{LogSkips, SilentSkip, SkipListener};
pub use result::{StepResult, StepStatus};
pub use transform::{Outcome, PassThrough, Transform};
pub use writer::ChunkWriter;
