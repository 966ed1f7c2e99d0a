use tracing::debug;

use crate::domain::SkipReason;

/// Observer for skipped records
///
/// Skips never change control flow; a listener can only report them.
pub trait SkipListener: Send + Sync {
    /// `position` is the zero-based record offset in the source
    fn on_skip(&self, step: &str, position: u64, reason: &SkipReason);
}

/// Skip records without any output (counters only)
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSkip;

impl SkipListener for SilentSkip {
    fn on_skip(&self, _step: &str, _position: u64, _reason: &SkipReason) {}
}

/// Log every skipped record at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSkips;

impl SkipListener for LogSkips {
    fn on_skip(&self, step: &str, position: u64, reason: &SkipReason) {
        debug!(step, position, field = %reason.field, reason = %reason.violation, "Skipping record");
    }
}
