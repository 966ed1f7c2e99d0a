pub mod cli;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use cli::{Cli, CliApp, JobKind, exit_code};
pub use error::AppError;
pub use logging::init_logging;
