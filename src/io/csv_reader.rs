use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use tokio::fs::File;
use tokio_util::compat::TokioAsyncReadCompatExt;

use super::error::IoError;

/// Lazy, finite stream of typed records from delimited text
///
/// The header row is consumed to bind columns by name. Every row must have
/// the header's field count; a row that cannot be coerced into `T` yields an
/// error item rather than ending the stream.
pub struct CsvRecordStream<T> {
    inner: Pin<Box<dyn Stream<Item = Result<T, IoError>> + Send>>,
}

impl<T> CsvRecordStream<T>
where
    T: DeserializeOwned + Send + 'static,
{
    /// Create a record stream from an async reader
    pub fn new<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        Self::starting_at(reader, 0)
    }

    /// Create a record stream that resumes after `offset` data records
    pub fn starting_at<R>(reader: R, offset: u64) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let csv_reader = AsyncReaderBuilder::new()
            .has_headers(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        let stream = csv_reader
            .into_deserialize::<T>()
            .skip(offset as usize)
            .map(|result| result.map_err(IoError::from));

        Self {
            inner: Box::pin(stream),
        }
    }

    /// Open `path` and stream its records, skipping the first `offset`
    ///
    /// # Example
    /// ```rust,ignore
    /// let orders = CsvRecordStream::<OrderCsvRecord>::from_file("orders_2025-01-01.csv", 0).await?;
    /// ```
    pub async fn from_file(path: impl AsRef<Path>, offset: u64) -> Result<Self, IoError> {
        let file = File::open(path.as_ref()).await?;
        Ok(Self::starting_at(file.compat(), offset))
    }
}

impl<T> Stream for CsvRecordStream<T> {
    type Item = Result<T, IoError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
