use crate::domain::{Order, OrderDailySummary};
use crate::engine::{Outcome, Transform, TransformError};

use super::writers::SummaryWriteMode;

/// How the daily summary step derives its rows
///
/// Each policy fixes both the aggregation strategy and the write mode, so a
/// step can never mix them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SummaryPolicy {
    /// Grouping query over the committed fact rows of the date, written with
    /// replace semantics. Re-running yields the same summary.
    #[default]
    Recompute,
    /// One contribution per committed fact row, added onto the stored
    /// summary. Re-running the step for the same date adds the totals again.
    Accumulate,
}

impl SummaryPolicy {
    pub fn write_mode(self) -> SummaryWriteMode {
        match self {
            Self::Recompute => SummaryWriteMode::Absolute,
            Self::Accumulate => SummaryWriteMode::Incremental,
        }
    }
}

/// Maps each fact row to its single-order contribution
#[derive(Debug, Clone, Copy, Default)]
pub struct FoldDailySummary;

impl Transform<Order, OrderDailySummary> for FoldDailySummary {
    fn apply(&self, order: Order) -> Result<Outcome<OrderDailySummary>, TransformError> {
        Ok(Outcome::Keep(OrderDailySummary::from_order(&order)))
    }
}
