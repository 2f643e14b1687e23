use thiserror::Error;

/// Errors raised while preparing bulk insert batches.
///
/// Every variant except `Cancelled` is raised before the first batch is
/// produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BulkInsertError {
    #[error("Invalid batch size: {0}, it must be > 0")]
    InvalidBatchSize(usize),

    #[error("SQL does not contain 'VALUES (' followed by ')...'")]
    MissingValuesTuple,

    #[error("SQL contains more than one 'VALUES (' followed by ')...' ({count} found)")]
    AmbiguousValuesTuple { count: usize },

    #[error("Bulk insert was cancelled")]
    Cancelled,
}

pub type BulkInsertResult<T> = Result<T, BulkInsertError>;
