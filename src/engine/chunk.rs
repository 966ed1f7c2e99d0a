use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::EngineError;
use super::listener::{SilentSkip, SkipListener};
use super::result::StepResult;
use super::transform::{Outcome, Transform};
use super::writer::ChunkWriter;
use crate::io::IoError;
use crate::storage::{StorageError, Store, StoreTransaction};

/// Chunk-oriented read/transform/write driver
///
/// A chunk is up to `chunk_size` records read from the source. The records of
/// a chunk that survive the transform are handed to the writer inside one
/// store transaction; a chunk whose records were all skipped opens no
/// transaction. Cancellation is only observed between chunks.
pub struct ChunkEngine<'s, S, L = SilentSkip>
where
    S: Store,
    L: SkipListener,
{
    store: &'s S,
    chunk_size: usize,
    start_offset: u64,
    cancellation: CancellationToken,
    listener: L,
}

impl<'s, S: Store> ChunkEngine<'s, S, SilentSkip> {
    /// Create an engine committing every `chunk_size` records read
    pub fn new(store: &'s S, chunk_size: usize) -> Result<Self, EngineError> {
        if chunk_size == 0 {
            return Err(EngineError::Configuration(
                "chunk size must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            store,
            chunk_size,
            start_offset: 0,
            cancellation: CancellationToken::new(),
            listener: SilentSkip,
        })
    }
}

impl<'s, S, L> ChunkEngine<'s, S, L>
where
    S: Store,
    L: SkipListener,
{
    /// Replace the skip listener
    pub fn with_listener<L2: SkipListener>(self, listener: L2) -> ChunkEngine<'s, S, L2> {
        ChunkEngine {
            store: self.store,
            chunk_size: self.chunk_size,
            start_offset: self.start_offset,
            cancellation: self.cancellation,
            listener,
        }
    }

    /// Stop at the next chunk boundary once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Offset of the first record the source will yield (for restarts)
    pub fn starting_at(mut self, offset: u64) -> Self {
        self.start_offset = offset;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Drive `source` through `transform` into `writer` until the source is
    /// exhausted, a fatal error occurs, or cancellation is requested
    ///
    /// Chunks committed before a failure stay committed.
    pub async fn run<I, O, Src, T, W>(
        &self,
        step: &str,
        mut source: Src,
        transform: &T,
        writer: &W,
    ) -> StepResult
    where
        Src: Stream<Item = Result<I, IoError>> + Unpin + Send,
        T: Transform<I, O>,
        W: ChunkWriter<O>,
        I: Send,
        O: Send,
    {
        let mut result = StepResult::new(step, self.start_offset);
        let mut chunk: Vec<O> = Vec::with_capacity(self.chunk_size);

        loop {
            if self.cancellation.is_cancelled() {
                info!(
                    step,
                    committed_offset = result.committed_offset,
                    "Step stopped at chunk boundary"
                );
                return result.stop();
            }

            chunk.clear();
            let mut read_in_chunk = 0;
            let mut exhausted = false;

            while read_in_chunk < self.chunk_size {
                let position = result.position();
                match source.next().await {
                    None => {
                        exhausted = true;
                        break;
                    }
                    Some(Err(e)) => {
                        warn!(step, position, error = %e, "Source read failed, abandoning chunk");
                        return result.fail(EngineError::SourceRead {
                            offset: position,
                            source: e,
                        });
                    }
                    Some(Ok(raw)) => {
                        read_in_chunk += 1;
                        result.read_count += 1;

                        match transform.apply(raw) {
                            Ok(Outcome::Keep(item)) => {
                                result.transformed_count += 1;
                                chunk.push(item);
                            }
                            Ok(Outcome::Skip(reason)) => {
                                result.skip_count += 1;
                                self.listener.on_skip(step, position, &reason);
                            }
                            Err(e) => {
                                warn!(step, position, error = %e, "Transform failed, abandoning chunk");
                                return result.fail(EngineError::Transform {
                                    offset: position,
                                    source: e,
                                });
                            }
                        }
                    }
                }
            }

            if read_in_chunk == 0 {
                break;
            }

            let chunk_number = result.chunk_count + 1;
            if !chunk.is_empty() {
                if let Err(e) = self.commit_chunk(writer, &chunk) {
                    warn!(
                        step,
                        chunk = chunk_number,
                        committed_offset = result.committed_offset,
                        error = %e,
                        "Chunk rolled back"
                    );
                    let committed_offset = result.committed_offset;
                    return result.fail(EngineError::ChunkWrite {
                        chunk: chunk_number,
                        committed_offset,
                        source: e,
                    });
                }
                result.write_count += chunk.len() as u64;
            }

            result.chunk_count = chunk_number;
            result.committed_offset = result.position();
            debug!(
                step,
                chunk = chunk_number,
                written = chunk.len(),
                committed_offset = result.committed_offset,
                "Chunk committed"
            );

            if exhausted {
                break;
            }
        }

        info!(
            step,
            read = result.read_count,
            skipped = result.skip_count,
            written = result.write_count,
            chunks = result.chunk_count,
            "Step completed"
        );
        result
    }

    /// One transaction per chunk; dropping it on error rolls back
    fn commit_chunk<O, W>(&self, writer: &W, chunk: &[O]) -> Result<(), StorageError>
    where
        W: ChunkWriter<O>,
    {
        let mut tx = self.store.begin()?;
        writer.write(&mut tx, chunk)?;
        tx.commit()
    }
}
