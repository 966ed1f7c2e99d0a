use std::sync::Arc;

use clap::Parser;
use tokio::io::{BufWriter, Stdout};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use order_batch::prelude::*;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The run still works without logs
    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Warning: {}", e);
    }

    CliApp::new("order-batch")
        .run(|stdout, cancellation| run_batch(cli, stdout, cancellation))
        .await
}

/// Open the store the command line asks for and run the selected job
async fn run_batch(
    cli: Cli,
    mut stdout: BufWriter<Stdout>,
    cancellation: CancellationToken,
) -> Result<JobStatus, AppError> {
    let params = JobParameters::from_args(&cli.params)?;
    let config = Arc::new(cli.report_config()?);

    match &cli.database {
        Some(path) => {
            let store = SqliteStore::open(path)?;
            execute(cli.job, &store, config, &params, cancellation, &mut stdout).await
        }
        None => {
            let store = MemoryStore::new();
            execute(cli.job, &store, config, &params, cancellation, &mut stdout).await
        }
    }
}

async fn execute<S: Store>(
    kind: JobKind,
    store: &S,
    config: Arc<ReportConfig>,
    params: &JobParameters,
    cancellation: CancellationToken,
    stdout: &mut BufWriter<Stdout>,
) -> Result<JobStatus, AppError> {
    let job: Job<S> = match kind {
        JobKind::OrderImport => order_import_job(config),
        JobKind::UserInit => user_init_job(config),
        JobKind::Hello => hello_job(),
    };

    let execution = job.run(store, params, cancellation).await;

    for step in &execution.step_results {
        info!(
            step = %step.step_name,
            status = ?step.status,
            read = step.read_count,
            skipped = step.skip_count,
            written = step.write_count,
            chunks = step.chunk_count,
            "Step summary"
        );
    }

    if let Some(failed) = execution.failed_step() {
        if let Some(e) = &failed.error {
            error!(step = %failed.step_name, committed_offset = failed.committed_offset, error = %e, "Job failed");
            eprintln!("Error: step {} failed: {}", failed.step_name, e);
        }
    }

    if execution.is_completed() && kind == JobKind::OrderImport {
        let date = params.date(TARGET_DATE)?;
        let rows: Vec<OrderDailySummary> = store.summary(date)?.into_iter().collect();
        write_summary_report(&rows, stdout).await?;
    }

    Ok(execution.status)
}
