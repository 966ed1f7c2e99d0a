pub mod aggregate;
pub mod config;
pub mod jobs;
pub mod steps;
pub mod transform;
pub mod writers;

// Re-export commonly used types
pub use aggregate::{FoldDailySummary, SummaryPolicy};
pub use config::ReportConfig;
pub use jobs::{
    HELLO_JOB, ORDER_IMPORT_JOB, USER_INIT_JOB, hello_job, order_import_job, user_init_job,
};
pub use steps::{
    DAILY_SUMMARY_STEP, DailySummaryStep, IMPORT_ORDERS_STEP, ImportOrdersStep, TARGET_DATE,
    USER_INIT_STEP, UserInitStep,
};
pub use transform::{OrderTransform, UserTransform};
pub use writers::{OrderUpsertWriter, SummaryWriteMode, SummaryWriter, UserInsertWriter};
