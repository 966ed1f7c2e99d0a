#[allow(clippy::module_inception)]
pub mod job;
pub mod parameters;
pub mod step;
pub mod tasklet;

// Re-export commonly used types
pub use job::{Job, JobExecution, JobStatus};
pub use parameters::{JobParameters, ParameterError};
pub use step::{Step, StepContext};
pub use tasklet::TaskletStep;
