use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::error::AppError;
use crate::domain::{ExchangeRates, FixedRateTable};
use crate::job::JobStatus;
use crate::report::{ReportConfig, SummaryPolicy};

/// Jobs the binary can launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JobKind {
    /// Import `orders_<targetDate>.csv` and rebuild its daily summary
    OrderImport,
    /// Load `users.csv` into the user table
    UserInit,
    /// Log a greeting from a single tasklet step
    Hello,
}

/// Command-line interface of `order-batch`
#[derive(Parser, Debug)]
#[command(name = "order-batch")]
#[command(version, about = "Chunk-oriented batch import of daily order files", long_about = None)]
pub struct Cli {
    /// SQLite database file; without it every table lives in memory
    #[arg(long, env = "ORDER_BATCH_DATABASE")]
    pub database: Option<PathBuf>,

    /// Directory containing the input CSV files
    #[arg(long, env = "ORDER_BATCH_INPUT_DIR", default_value = ".")]
    pub input_dir: PathBuf,

    /// Exchange rate into KRW, repeatable (defaults to USD=1300)
    #[arg(long = "rate", value_name = "CUR=RATE", value_parser = parse_rate)]
    pub rates: Vec<(String, i64)>,

    /// How the daily summary is derived
    #[arg(long, value_enum, env = "ORDER_BATCH_POLICY", default_value_t = SummaryPolicy::Recompute)]
    pub policy: SummaryPolicy,

    /// Records read per import chunk
    #[arg(long, env = "ORDER_BATCH_CHUNK_SIZE")]
    pub chunk_size: Option<usize>,

    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,

    #[arg(value_enum)]
    pub job: JobKind,

    /// Job parameters, e.g. `targetDate=2025-01-01`
    #[arg(value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}

fn parse_rate(arg: &str) -> Result<(String, i64), String> {
    let (currency, rate) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected CUR=RATE, got `{}`", arg))?;
    let rate: i64 = rate
        .trim()
        .parse()
        .map_err(|e| format!("invalid rate `{}`: {}", rate, e))?;
    if rate <= 0 {
        return Err(format!("rate must be positive, got {}", rate));
    }
    Ok((currency.trim().to_uppercase(), rate))
}

impl Cli {
    /// Pipeline configuration with command-line overrides applied
    pub fn report_config(&self) -> Result<ReportConfig, AppError> {
        let defaults = ReportConfig::default();

        let mut table = FixedRateTable::new(defaults.rates.canonical_currency());
        if self.rates.is_empty() {
            table = table.with_rate("USD", 1300);
        }
        for (currency, rate) in &self.rates {
            if currency == table.canonical_currency() {
                return Err(AppError::InvalidArguments(format!(
                    "{} is the canonical currency and takes no rate",
                    currency
                )));
            }
            table = table.with_rate(currency.as_str(), *rate);
        }

        let mut allowed: Vec<String> = table.currencies().map(str::to_string).collect();
        allowed.sort();
        allowed.insert(0, table.canonical_currency().to_string());

        let import_chunk_size = match self.chunk_size {
            Some(0) => {
                return Err(AppError::InvalidArguments(
                    "chunk size must be at least 1".to_string(),
                ));
            }
            Some(n) => n,
            None => defaults.import_chunk_size,
        };

        Ok(ReportConfig {
            input_dir: self.input_dir.clone(),
            import_chunk_size,
            allowed_currencies: allowed,
            rates: Arc::new(table),
            summary_policy: self.policy,
            ..defaults
        })
    }
}

/// Reusable CLI application runner that handles:
/// - Signal handling (SIGINT, SIGTERM, SIGHUP) by cancelling the job
/// - Stdout buffering
/// - Exit codes (0 = completed, 1 = error, 130/143/129 = stopped by signal)
pub struct CliApp {
    name: String,
}

impl CliApp {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    /// Run `main_fn` to completion and exit the process
    ///
    /// A signal does not abort `main_fn`; it cancels the token so the running
    /// step stops at its next chunk boundary, and the signal's exit code is
    /// used once `main_fn` returns.
    pub async fn run<F, Fut>(self, main_fn: F) -> !
    where
        F: FnOnce(tokio::io::BufWriter<tokio::io::Stdout>, CancellationToken) -> Fut,
        Fut: Future<Output = Result<JobStatus, AppError>>,
    {
        let writer = tokio::io::BufWriter::new(tokio::io::stdout());
        let token = CancellationToken::new();

        let main = main_fn(writer, token.clone());
        tokio::pin!(main);
        let signal = wait_for_signal();
        tokio::pin!(signal);

        let mut received = None;
        let result = loop {
            tokio::select! {
                result = &mut main => break result,
                code = &mut signal, if received.is_none() => {
                    warn!(app = %self.name, "Signal received, stopping at next chunk boundary");
                    received = Some(code);
                    token.cancel();
                }
            }
        };

        if let Err(e) = &result {
            eprintln!("Error: {}", e);
        }
        std::process::exit(exit_code(&result, received));
    }
}

/// Process exit code for a finished run
pub fn exit_code(result: &Result<JobStatus, AppError>, signal: Option<i32>) -> i32 {
    match (result, signal) {
        (Ok(JobStatus::Completed), _) => 0,
        (Ok(JobStatus::Stopped), Some(code)) => code,
        (Ok(JobStatus::Stopped), None) => 130,
        (Ok(JobStatus::Failed), _) | (Err(_), _) => 1,
    }
}

/// Wait for any Unix signal (SIGINT, SIGTERM, SIGHUP) or Ctrl+C
/// Returns the exit code to use (130 for SIGINT, 143 for SIGTERM, etc.)
async fn wait_for_signal() -> i32 {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate()).expect("Failed to setup SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("Failed to setup SIGINT handler");
        let mut sighup = signal(SignalKind::hangup()).expect("Failed to setup SIGHUP handler");

        tokio::select! {
            _ = sigterm.recv() => 143, // 128 + 15
            _ = sigint.recv() => 130,  // 128 + 2
            _ = sighup.recv() => 129,  // 128 + 1
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to setup Ctrl+C handler");
        130
    }
}
