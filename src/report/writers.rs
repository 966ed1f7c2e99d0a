use crate::domain::{Order, OrderDailySummary, User};
use crate::engine::ChunkWriter;
use crate::storage::{StorageError, StoreTransaction};

/// Upserts fact rows by `order_id`
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderUpsertWriter;

impl ChunkWriter<Order> for OrderUpsertWriter {
    fn write<X: StoreTransaction>(&self, tx: &mut X, chunk: &[Order]) -> Result<(), StorageError> {
        tx.upsert_orders(chunk)
    }
}

/// Conflict behaviour of summary writes on an existing date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryWriteMode {
    /// Stored totals are overwritten
    Absolute,
    /// Incoming totals are added to stored totals
    Incremental,
}

#[derive(Debug, Clone, Copy)]
pub struct SummaryWriter {
    mode: SummaryWriteMode,
}

impl SummaryWriter {
    pub fn new(mode: SummaryWriteMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> SummaryWriteMode {
        self.mode
    }
}

impl ChunkWriter<OrderDailySummary> for SummaryWriter {
    fn write<X: StoreTransaction>(
        &self,
        tx: &mut X,
        chunk: &[OrderDailySummary],
    ) -> Result<(), StorageError> {
        match self.mode {
            SummaryWriteMode::Absolute => tx.replace_summaries(chunk),
            SummaryWriteMode::Incremental => tx.accumulate_summaries(chunk),
        }
    }
}

/// Plain insert of users; an existing id fails the chunk
#[derive(Debug, Clone, Copy, Default)]
pub struct UserInsertWriter;

impl ChunkWriter<User> for UserInsertWriter {
    fn write<X: StoreTransaction>(&self, tx: &mut X, chunk: &[User]) -> Result<(), StorageError> {
        tx.insert_users(chunk)
    }
}
