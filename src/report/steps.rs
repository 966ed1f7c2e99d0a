use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use tracing::debug;

use super::aggregate::{FoldDailySummary, SummaryPolicy};
use super::config::ReportConfig;
use super::transform::{OrderTransform, UserTransform};
use super::writers::{OrderUpsertWriter, SummaryWriter, UserInsertWriter};
use crate::engine::{ChunkEngine, EngineError, LogSkips, PassThrough, StepResult};
use crate::io::{CsvRecordStream, IoError, OrderCsvRecord, UserCsvRecord};
use crate::job::{Step, StepContext};
use crate::storage::Store;

/// Job parameter naming the date partition
pub const TARGET_DATE: &str = "targetDate";

pub const IMPORT_ORDERS_STEP: &str = "import_orders";
pub const DAILY_SUMMARY_STEP: &str = "daily_summary";
pub const USER_INIT_STEP: &str = "user_init";

fn chunk_engine<'s, S: Store>(
    ctx: &StepContext<'s, S>,
    chunk_size: usize,
) -> Result<ChunkEngine<'s, S, LogSkips>, EngineError> {
    Ok(ChunkEngine::new(ctx.store, chunk_size)?
        .with_listener(LogSkips)
        .with_cancellation(ctx.cancellation.clone())
        .starting_at(ctx.start_offset))
}

/// Loads `orders_<targetDate>.csv` into the fact table
pub struct ImportOrdersStep {
    config: Arc<ReportConfig>,
    transform: OrderTransform,
}

impl ImportOrdersStep {
    pub fn new(config: Arc<ReportConfig>) -> Self {
        let transform = OrderTransform::new(&config);
        Self { config, transform }
    }

    async fn try_execute<S: Store>(&self, ctx: StepContext<'_, S>) -> Result<StepResult, EngineError> {
        let date = ctx.params.date(TARGET_DATE)?;
        let engine = chunk_engine(&ctx, self.config.import_chunk_size)?;
        let path = self.config.orders_file(date);
        let source = CsvRecordStream::<OrderCsvRecord>::from_file(&path, ctx.start_offset)
            .await
            .map_err(EngineError::SourceOpen)?;

        Ok(engine
            .run(IMPORT_ORDERS_STEP, source, &self.transform, &OrderUpsertWriter)
            .await)
    }
}

#[async_trait]
impl<S: Store> Step<S> for ImportOrdersStep {
    fn name(&self) -> &str {
        IMPORT_ORDERS_STEP
    }

    async fn execute(&self, ctx: StepContext<'_, S>) -> StepResult {
        let offset = ctx.start_offset;
        self.try_execute(ctx)
            .await
            .unwrap_or_else(|e| StepResult::failed_at_start(IMPORT_ORDERS_STEP, offset, e))
    }
}

/// Derives the summary row of `targetDate` from the committed fact rows
pub struct DailySummaryStep {
    config: Arc<ReportConfig>,
}

impl DailySummaryStep {
    pub fn new(config: Arc<ReportConfig>) -> Self {
        Self { config }
    }

    async fn try_execute<S: Store>(&self, ctx: StepContext<'_, S>) -> Result<StepResult, EngineError> {
        let date = ctx.params.date(TARGET_DATE)?;
        let engine = chunk_engine(&ctx, self.config.summary_chunk_size)?;
        let policy = self.config.summary_policy;
        let writer = SummaryWriter::new(policy.write_mode());
        let skip = ctx.start_offset as usize;
        debug!(
            %date,
            chunk_size = engine.chunk_size(),
            mode = ?writer.mode(),
            "Summarizing orders"
        );

        let result = match policy {
            SummaryPolicy::Recompute => {
                let totals = ctx.store.daily_totals(date)?;
                let source = stream::iter(totals.into_iter().skip(skip).map(Ok::<_, IoError>));
                engine
                    .run(DAILY_SUMMARY_STEP, source, &PassThrough, &writer)
                    .await
            }
            SummaryPolicy::Accumulate => {
                let orders = ctx.store.orders_on(date)?;
                let source = stream::iter(orders.into_iter().skip(skip).map(Ok::<_, IoError>));
                engine
                    .run(DAILY_SUMMARY_STEP, source, &FoldDailySummary, &writer)
                    .await
            }
        };
        Ok(result)
    }
}

#[async_trait]
impl<S: Store> Step<S> for DailySummaryStep {
    fn name(&self) -> &str {
        DAILY_SUMMARY_STEP
    }

    async fn execute(&self, ctx: StepContext<'_, S>) -> StepResult {
        let offset = ctx.start_offset;
        self.try_execute(ctx)
            .await
            .unwrap_or_else(|e| StepResult::failed_at_start(DAILY_SUMMARY_STEP, offset, e))
    }
}

/// Loads adult users from `users.csv`
pub struct UserInitStep {
    config: Arc<ReportConfig>,
    transform: UserTransform,
}

impl UserInitStep {
    pub fn new(config: Arc<ReportConfig>) -> Self {
        let transform = UserTransform::new(config.min_user_age);
        Self { config, transform }
    }

    async fn try_execute<S: Store>(&self, ctx: StepContext<'_, S>) -> Result<StepResult, EngineError> {
        let engine = chunk_engine(&ctx, self.config.user_chunk_size)?;
        let source =
            CsvRecordStream::<UserCsvRecord>::from_file(self.config.users_file(), ctx.start_offset)
                .await
                .map_err(EngineError::SourceOpen)?;

        Ok(engine
            .run(USER_INIT_STEP, source, &self.transform, &UserInsertWriter)
            .await)
    }
}

#[async_trait]
impl<S: Store> Step<S> for UserInitStep {
    fn name(&self) -> &str {
        USER_INIT_STEP
    }

    async fn execute(&self, ctx: StepContext<'_, S>) -> StepResult {
        let offset = ctx.start_offset;
        self.try_execute(ctx)
            .await
            .unwrap_or_else(|e| StepResult::failed_at_start(USER_INIT_STEP, offset, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StepStatus;
    use crate::job::JobParameters;
    use crate::storage::MemoryStore;
    use std::fs;
    use tempfile::TempDir;
    use tokio_util::sync::CancellationToken;

    const HEADER: &str = "order_id,user_id,order_datetime,amount,currency,status,item_count\n";

    fn config_in(dir: &TempDir) -> Arc<ReportConfig> {
        Arc::new(ReportConfig {
            input_dir: dir.path().to_path_buf(),
            ..ReportConfig::default()
        })
    }

    fn ctx<'a>(store: &'a MemoryStore, params: &'a JobParameters) -> StepContext<'a, MemoryStore> {
        StepContext {
            store,
            params,
            cancellation: CancellationToken::new(),
            start_offset: 0,
        }
    }

    #[tokio::test]
    async fn import_reads_partition_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("orders_2025-01-01.csv"),
            format!(
                "{}O-1,1,2025-01-01 10:00:00,100,KRW,PAID,2\nO-2,2,2025-01-01 11:00:00,50,KRW,CANCELLED,1\n",
                HEADER
            ),
        )
        .unwrap();
        let store = MemoryStore::new();
        let params = JobParameters::new().with(TARGET_DATE, "2025-01-01");
        let step = ImportOrdersStep::new(config_in(&dir));

        let result = Step::<MemoryStore>::execute(&step, ctx(&store, &params)).await;

        assert!(result.is_completed());
        assert_eq!(result.read_count, 2);
        assert_eq!(result.skip_count, 1);
        assert_eq!(result.write_count, 1);
        assert!(store.order("O-1").unwrap().is_some());
    }

    #[tokio::test]
    async fn missing_partition_file_fails_before_any_chunk() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new();
        let params = JobParameters::new().with(TARGET_DATE, "2025-01-09");
        let step = ImportOrdersStep::new(config_in(&dir));

        let result = Step::<MemoryStore>::execute(&step, ctx(&store, &params)).await;

        assert_eq!(result.status, StepStatus::Failed);
        assert!(matches!(result.error, Some(EngineError::SourceOpen(_))));
        assert_eq!(result.chunk_count, 0);
    }

    #[tokio::test]
    async fn summary_without_date_parameter_fails() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new();
        let params = JobParameters::new();
        let step = DailySummaryStep::new(config_in(&dir));

        let result = Step::<MemoryStore>::execute(&step, ctx(&store, &params)).await;

        assert_eq!(result.status, StepStatus::Failed);
        assert!(matches!(result.error, Some(EngineError::Parameter(_))));
    }

    #[tokio::test]
    async fn summary_of_empty_partition_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new();
        let params = JobParameters::new().with(TARGET_DATE, "2025-01-01");
        let step = DailySummaryStep::new(config_in(&dir));

        let result = Step::<MemoryStore>::execute(&step, ctx(&store, &params)).await;

        assert!(result.is_completed());
        assert_eq!(result.read_count, 0);
        assert!(store.summaries().unwrap().is_empty());
    }

    #[tokio::test]
    async fn user_init_keeps_adults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("users.csv"),
            "id,name,age\n1,kim,30\n2,lee,17\n3,park,18\n4,choi,19\n",
        )
        .unwrap();
        let store = MemoryStore::new();
        let params = JobParameters::new();
        let step = UserInitStep::new(config_in(&dir));

        let result = Step::<MemoryStore>::execute(&step, ctx(&store, &params)).await;

        assert!(result.is_completed());
        assert_eq!(result.skip_count, 2);
        let ids: Vec<i64> = store.users().unwrap().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }
}
