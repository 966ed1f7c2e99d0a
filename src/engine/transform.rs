use super::error::TransformError;
use crate::domain::SkipReason;

/// Result of transforming one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Record goes to the chunk buffer
    Keep(T),
    /// Record is discarded; the step continues
    Skip(SkipReason),
}

impl<T> Outcome<T> {
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip(_))
    }

    pub fn kept(self) -> Option<T> {
        match self {
            Self::Keep(item) => Some(item),
            Self::Skip(_) => None,
        }
    }
}

/// Per-record transformation stage
///
/// Implementations must be deterministic and free of side effects. Business
/// rule failures are reported as [`Outcome::Skip`]; only failures that should
/// abort the step are returned as errors.
pub trait Transform<I, O>: Send + Sync {
    fn apply(&self, input: I) -> Result<Outcome<O>, TransformError>;
}

impl<I, O, F> Transform<I, O> for F
where
    F: Fn(I) -> Result<Outcome<O>, TransformError> + Send + Sync,
{
    fn apply(&self, input: I) -> Result<Outcome<O>, TransformError> {
        self(input)
    }
}

/// Identity transform
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl<T> Transform<T, T> for PassThrough {
    fn apply(&self, input: T) -> Result<Outcome<T>, TransformError> {
        Ok(Outcome::Keep(input))
    }
}
