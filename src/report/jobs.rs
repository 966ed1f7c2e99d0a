use std::sync::Arc;

use super::config::ReportConfig;
use super::steps::{DailySummaryStep, ImportOrdersStep, UserInitStep};
use tracing::info;

use crate::job::{Job, TaskletStep};
use crate::storage::Store;

pub const ORDER_IMPORT_JOB: &str = "order_import";
pub const USER_INIT_JOB: &str = "user_init";
pub const HELLO_JOB: &str = "hello";
pub const HELLO_STEP: &str = "hello";

/// Import the `targetDate` partition, then rebuild its daily summary
pub fn order_import_job<S: Store>(config: Arc<ReportConfig>) -> Job<S> {
    Job::new(ORDER_IMPORT_JOB)
        .step(ImportOrdersStep::new(config.clone()))
        .step(DailySummaryStep::new(config))
}

/// Load the user table from `users.csv`
pub fn user_init_job<S: Store>(config: Arc<ReportConfig>) -> Job<S> {
    Job::new(USER_INIT_JOB).step(UserInitStep::new(config))
}

/// Single tasklet that logs a greeting; a smoke test for the job runner
pub fn hello_job<S: Store>() -> Job<S> {
    Job::new(HELLO_JOB).step(TaskletStep::new(HELLO_STEP, |_| {
        info!("Hello World");
        Ok(())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::steps::{DAILY_SUMMARY_STEP, IMPORT_ORDERS_STEP, USER_INIT_STEP};
    use crate::job::JobParameters;
    use crate::storage::MemoryStore;
    use tokio_util::sync::CancellationToken;

    #[test]
    fn order_import_job_runs_import_before_summary() {
        let job: Job<MemoryStore> = order_import_job(Arc::new(ReportConfig::default()));
        assert_eq!(job.name(), ORDER_IMPORT_JOB);
        assert_eq!(job.step_names(), vec![IMPORT_ORDERS_STEP, DAILY_SUMMARY_STEP]);
    }

    #[test]
    fn user_init_job_has_single_step() {
        let job: Job<MemoryStore> = user_init_job(Arc::new(ReportConfig::default()));
        assert_eq!(job.step_names(), vec![USER_INIT_STEP]);
    }

    #[tokio::test]
    async fn hello_job_completes_without_touching_the_store() {
        let job: Job<MemoryStore> = hello_job();
        let store = MemoryStore::new();

        let execution = job
            .run(&store, &JobParameters::new(), CancellationToken::new())
            .await;

        assert!(execution.is_completed());
        assert_eq!(job.step_names(), vec![HELLO_STEP]);
        assert!(store.orders().unwrap().is_empty());
    }
}
