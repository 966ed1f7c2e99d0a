use async_trait::async_trait;

use super::parameters::JobParameters;
use super::step::{Step, StepContext};
use crate::engine::{EngineError, StepResult};
use crate::storage::Store;

/// A step that runs one function once instead of reading records in chunks
///
/// The function sees the job parameters only. Its result counters stay at
/// zero; an error fails the step.
pub struct TaskletStep<F> {
    name: String,
    task: F,
}

impl<F> TaskletStep<F>
where
    F: Fn(&JobParameters) -> Result<(), EngineError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, task: F) -> Self {
        Self {
            name: name.into(),
            task,
        }
    }
}

#[async_trait]
impl<S, F> Step<S> for TaskletStep<F>
where
    S: Store,
    F: Fn(&JobParameters) -> Result<(), EngineError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: StepContext<'_, S>) -> StepResult {
        let result = StepResult::new(self.name.as_str(), ctx.start_offset);
        match (self.task)(ctx.params) {
            Ok(()) => result,
            Err(e) => result.fail(e),
        }
    }
}
