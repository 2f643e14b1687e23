use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::domain::{
    bulk_insert_commands::{BatchCommand, BulkInsert},
    error::BulkInsertError,
    param::{FieldExtractor, ParamSource, SourceFields},
};

/// Runs generated batches against a data store.
///
/// Opening connections, binding parameters and transaction scope belong to
/// the implementation. Its errors reach the caller unchanged.
pub trait CommandExecutor {
    type Error: From<BulkInsertError>;

    /// Executes one batch and returns the number of affected rows.
    fn execute(&mut self, command: &BatchCommand) -> Result<u64, Self::Error>;
}

#[async_trait]
pub trait AsyncCommandExecutor: Send {
    type Error: From<BulkInsertError> + Send;

    async fn execute(&mut self, command: &BatchCommand) -> Result<u64, Self::Error>;
}

/// Inserts every row, one batch at a time, and returns the total affected
/// row count.
pub fn bulk_insert<X, I>(
    executor: &mut X,
    bulk_insert: &BulkInsert<'_>,
    rows: I,
) -> Result<u64, X::Error>
where
    X: CommandExecutor + ?Sized,
    I: IntoIterator,
    I::Item: ParamSource,
{
    bulk_insert_with(executor, bulk_insert, rows, SourceFields::<I::Item>::new())
}

pub fn bulk_insert_with<X, I, E>(
    executor: &mut X,
    bulk_insert: &BulkInsert<'_>,
    rows: I,
    extractor: E,
) -> Result<u64, X::Error>
where
    X: CommandExecutor + ?Sized,
    I: IntoIterator,
    E: FieldExtractor<I::Item>,
{
    let mut affected_rows = 0u64;
    let mut batch_count = 0usize;
    for command in bulk_insert.commands_with(rows, extractor)? {
        affected_rows += executor.execute(&command)?;
        batch_count += 1;
    }

    info!(batch_count, affected_rows, "bulk insert finished");
    Ok(affected_rows)
}

/// Async counterpart of [`bulk_insert`].
///
/// Produces the same batches in the same order. `cancellation` is checked
/// before each batch is executed, never while one is being built.
pub async fn bulk_insert_async<X, I>(
    executor: &mut X,
    bulk_insert: &BulkInsert<'_>,
    rows: I,
    cancellation: &CancellationToken,
) -> Result<u64, X::Error>
where
    X: AsyncCommandExecutor + ?Sized,
    I: IntoIterator,
    I::Item: ParamSource,
{
    bulk_insert_async_with(
        executor,
        bulk_insert,
        rows,
        SourceFields::<I::Item>::new(),
        cancellation,
    )
    .await
}

pub async fn bulk_insert_async_with<X, I, E>(
    executor: &mut X,
    bulk_insert: &BulkInsert<'_>,
    rows: I,
    extractor: E,
    cancellation: &CancellationToken,
) -> Result<u64, X::Error>
where
    X: AsyncCommandExecutor + ?Sized,
    I: IntoIterator,
    E: FieldExtractor<I::Item>,
{
    let mut affected_rows = 0u64;
    let mut batch_count = 0usize;
    for command in bulk_insert.commands_with(rows, extractor)? {
        if cancellation.is_cancelled() {
            warn!(batch_count, affected_rows, "bulk insert cancelled");
            return Err(BulkInsertError::Cancelled.into());
        }
        affected_rows += executor.execute(&command).await?;
        batch_count += 1;
    }

    info!(batch_count, affected_rows, "bulk insert finished");
    Ok(affected_rows)
}
