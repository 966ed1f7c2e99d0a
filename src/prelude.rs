//! Prelude module for convenient imports
//!
//! Import everything you need with: `use order_batch::prelude::*;`

// Domain types
pub use crate::domain::{
    DatedRateTable, DomainError, ExchangeRates, FixedRateTable, Order, OrderDailySummary, Rule,
    RuleSet, SkipReason, User, Violation,
};

// Storage types
pub use crate::storage::{MemoryStore, SqliteStore, StorageError, Store, StoreTransaction};

// Engine types
pub use crate::engine::{
    ChunkEngine, ChunkWriter, EngineError, LogSkips, Outcome, PassThrough, SilentSkip,
    SkipListener, StepResult, StepStatus, Transform, TransformError,
};

// IO types
pub use crate::io::{CsvRecordStream, IoError, OrderCsvRecord, UserCsvRecord, write_summary_report};

// Job types
pub use crate::job::{
    Job, JobExecution, JobParameters, JobStatus, ParameterError, Step, StepContext, TaskletStep,
};

// Report pipeline
pub use crate::report::{
    DAILY_SUMMARY_STEP, IMPORT_ORDERS_STEP, ReportConfig, SummaryPolicy, TARGET_DATE,
    USER_INIT_STEP, hello_job, order_import_job, user_init_job,
};

// App types
pub use crate::app::{AppError, Cli, CliApp, JobKind, init_logging};
