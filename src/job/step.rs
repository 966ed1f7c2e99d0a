use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::parameters::JobParameters;
use crate::engine::StepResult;
use crate::storage::Store;

/// Everything a step needs at execution time
pub struct StepContext<'a, S: Store> {
    pub store: &'a S,
    pub params: &'a JobParameters,
    pub cancellation: CancellationToken,
    /// Records of the source already committed by a previous attempt
    pub start_offset: u64,
}

/// A named, self-contained unit of a job
///
/// Parameters are resolved inside `execute`; a bad parameter produces a
/// failed [`StepResult`] before any chunk runs.
#[async_trait]
pub trait Step<S: Store>: Send + Sync {
    fn name(&self) -> &str;

    async fn execute(&self, ctx: StepContext<'_, S>) -> StepResult;
}
