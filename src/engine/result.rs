use super::error::EngineError;

/// Terminal status of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Failed,
    /// Cancelled at a chunk boundary
    Stopped,
}

/// Outcome and counters of one step execution
///
/// `committed_offset` is the source offset just past the last chunk whose
/// transaction committed; restarting from it never re-reads committed work.
#[derive(Debug)]
pub struct StepResult {
    pub step_name: String,
    pub status: StepStatus,
    pub read_count: u64,
    pub transformed_count: u64,
    pub skip_count: u64,
    pub write_count: u64,
    pub chunk_count: u64,
    pub start_offset: u64,
    pub committed_offset: u64,
    pub error: Option<EngineError>,
}

impl StepResult {
    pub fn new(step_name: impl Into<String>, start_offset: u64) -> Self {
        Self {
            step_name: step_name.into(),
            status: StepStatus::Completed,
            read_count: 0,
            transformed_count: 0,
            skip_count: 0,
            write_count: 0,
            chunk_count: 0,
            start_offset,
            committed_offset: start_offset,
            error: None,
        }
    }

    /// A step that failed before any chunk ran (e.g. bad parameters)
    pub fn failed_at_start(step_name: impl Into<String>, start_offset: u64, error: EngineError) -> Self {
        Self::new(step_name, start_offset).fail(error)
    }

    pub fn fail(mut self, error: EngineError) -> Self {
        self.status = StepStatus::Failed;
        self.error = Some(error);
        self
    }

    pub fn stop(mut self) -> Self {
        self.status = StepStatus::Stopped;
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == StepStatus::Completed
    }

    /// Source offset of the next record to read
    pub fn position(&self) -> u64 {
        self.start_offset + self.read_count
    }
}
