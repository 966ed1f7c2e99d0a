use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use super::error::AppError;

/// Install the global subscriber
///
/// Logs go to stderr; stdout carries only the report. `RUST_LOG` overrides
/// the default level (`info`, or `debug` when `verbose`).
pub fn init_logging(verbose: bool) -> Result<(), AppError> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}
