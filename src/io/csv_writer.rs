use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::error::IoError;
use crate::domain::OrderDailySummary;

/// Write daily summaries as CSV, header included
pub async fn write_summary_report<W>(rows: &[OrderDailySummary], mut writer: W) -> Result<(), IoError>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut csv_writer = csv::Writer::from_writer(Vec::new());
    csv_writer.write_record([
        "order_date",
        "total_amount",
        "total_order_count",
        "total_item_count",
    ])?;

    for row in rows {
        csv_writer.write_record([
            row.order_date.format("%Y-%m-%d").to_string(),
            row.total_amount.to_string(),
            row.total_order_count.to_string(),
            row.total_item_count.to_string(),
        ])?;
    }

    let bytes = csv_writer
        .into_inner()
        .map_err(|e| IoError::Encoding(e.to_string()))?;

    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}
