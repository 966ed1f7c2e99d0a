use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span, warn};

use super::parameters::JobParameters;
use super::step::{Step, StepContext};
use crate::engine::{EngineError, StepResult, StepStatus};
use crate::storage::Store;

/// Terminal status of a job execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Completed,
    Failed,
    Stopped,
}

/// Record of one job run: its parameters and the results of the steps that ran
#[derive(Debug)]
pub struct JobExecution {
    pub job_name: String,
    pub params: JobParameters,
    pub status: JobStatus,
    pub step_results: Vec<StepResult>,
}

impl JobExecution {
    pub fn is_completed(&self) -> bool {
        self.status == JobStatus::Completed
    }

    /// The step that ended the run early, if any
    pub fn failed_step(&self) -> Option<&StepResult> {
        self.step_results.iter().find(|r| !r.is_completed())
    }

    pub fn step(&self, name: &str) -> Option<&StepResult> {
        self.step_results.iter().find(|r| r.step_name == name)
    }
}

/// Ordered sequence of steps sharing one store
///
/// Steps run strictly one after another; a step only starts once everything
/// the previous step committed is visible.
pub struct Job<S: Store> {
    name: String,
    steps: Vec<Box<dyn Step<S>>>,
}

impl<S: Store> Job<S> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step
    pub fn step(mut self, step: impl Step<S> + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step from the beginning
    pub async fn run(
        &self,
        store: &S,
        params: &JobParameters,
        cancellation: CancellationToken,
    ) -> JobExecution {
        info!(job = %self.name, params = %params, "Starting job");
        self.execute(store, params, cancellation, 0, 0).await
    }

    /// Continue a previous execution that did not complete
    ///
    /// Steps that completed are not re-run; the step that failed or stopped
    /// restarts from its last committed offset.
    pub async fn resume(
        &self,
        store: &S,
        previous: &JobExecution,
        cancellation: CancellationToken,
    ) -> JobExecution {
        let params = &previous.params;
        let Some(unfinished) = previous.failed_step() else {
            info!(job = %self.name, "Previous execution completed, nothing to resume");
            return JobExecution {
                job_name: self.name.clone(),
                params: params.clone(),
                status: JobStatus::Completed,
                step_results: Vec::new(),
            };
        };

        let Some(first) = self
            .steps
            .iter()
            .position(|s| s.name() == unfinished.step_name)
        else {
            warn!(
                job = %self.name,
                step = %unfinished.step_name,
                "Previous execution names a step this job does not have"
            );
            let error = EngineError::Configuration(format!(
                "job `{}` has no step `{}` to resume",
                self.name, unfinished.step_name
            ));
            return JobExecution {
                job_name: self.name.clone(),
                params: params.clone(),
                status: JobStatus::Failed,
                step_results: vec![StepResult::failed_at_start(
                    unfinished.step_name.as_str(),
                    unfinished.committed_offset,
                    error,
                )],
            };
        };
        info!(
            job = %self.name,
            step = %unfinished.step_name,
            offset = unfinished.committed_offset,
            "Resuming job"
        );
        self.execute(store, params, cancellation, first, unfinished.committed_offset)
            .await
    }

    async fn execute(
        &self,
        store: &S,
        params: &JobParameters,
        cancellation: CancellationToken,
        first_step: usize,
        first_offset: u64,
    ) -> JobExecution {
        let mut execution = JobExecution {
            job_name: self.name.clone(),
            params: params.clone(),
            status: JobStatus::Completed,
            step_results: Vec::new(),
        };

        for (index, step) in self.steps.iter().enumerate().skip(first_step) {
            if cancellation.is_cancelled() {
                execution.status = JobStatus::Stopped;
                break;
            }

            let ctx = StepContext {
                store,
                params,
                cancellation: cancellation.clone(),
                start_offset: if index == first_step { first_offset } else { 0 },
            };
            let span = info_span!("step", job = %self.name, step = step.name());
            let result = step.execute(ctx).instrument(span).await;

            let status = result.status;
            execution.step_results.push(result);

            match status {
                StepStatus::Completed => {}
                StepStatus::Failed => {
                    if let Some(failed) = execution.step_results.last() {
                        warn!(
                            job = %self.name,
                            step = %failed.step_name,
                            committed_offset = failed.committed_offset,
                            error = ?failed.error,
                            "Step failed, job aborted"
                        );
                    }
                    execution.status = JobStatus::Failed;
                    break;
                }
                StepStatus::Stopped => {
                    execution.status = JobStatus::Stopped;
                    break;
                }
            }
        }

        info!(job = %self.name, status = ?execution.status, "Job finished");
        execution
    }
}
