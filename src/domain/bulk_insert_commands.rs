use std::{num::NonZeroUsize, sync::Arc};

use tracing::{debug, trace};

use crate::domain::{
    error::{BulkInsertError, BulkInsertResult},
    param::{FieldExtractor, Param, ParamSource, SourceFields},
    row_batch::RowBatches,
    values_template::ValuesTemplate,
};

/// Bound-parameter ceiling used to derive a batch size when none is given.
/// It is SQLite's limit and is also safe for MySQL and SQL Server.
pub const MAX_PARAMS_PER_BATCH: usize = 999;

/// One executable statement covering a contiguous slice of the rows.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchCommand {
    /// Shared by every batch with the same row count.
    pub sql: Arc<str>,
    pub params: Vec<Param>,
    pub row_count: usize,
}

/// Settings for turning one `INSERT ... VALUES (...)...` statement into
/// batched commands.
#[derive(Debug, Clone)]
pub struct BulkInsert<'a> {
    sql: &'a str,
    common_params: Vec<Param>,
    batch_size: Option<usize>,
}

impl<'a> BulkInsert<'a> {
    pub fn new(sql: &'a str) -> Self {
        Self {
            sql,
            common_params: Vec::new(),
            batch_size: None,
        }
    }

    /// Rows per batch. Derived from [`MAX_PARAMS_PER_BATCH`] when unset.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn with_batch_size(mut self, batch_size: Option<usize>) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Parameters shared, unsuffixed, by every row of every batch.
    pub fn common<C: ParamSource>(mut self, common: &C) -> Self {
        self.common_params = common.params();
        self
    }

    pub fn common_params(mut self, common_params: Vec<Param>) -> Self {
        self.common_params = common_params;
        self
    }

    pub fn sql(&self) -> &'a str {
        self.sql
    }

    /// Prepares the batches for rows implementing [`ParamSource`].
    pub fn commands<I>(
        &self,
        rows: I,
    ) -> BulkInsertResult<BulkInsertCommands<'a, I::IntoIter, SourceFields<I::Item>>>
    where
        I: IntoIterator,
        I::Item: ParamSource,
    {
        self.commands_with(rows, SourceFields::new())
    }

    /// Prepares the batches, reading row fields through `extractor`.
    ///
    /// All validation happens here; the returned iterator never fails.
    pub fn commands_with<I, E>(
        &self,
        rows: I,
        extractor: E,
    ) -> BulkInsertResult<BulkInsertCommands<'a, I::IntoIter, E>>
    where
        I: IntoIterator,
        E: FieldExtractor<I::Item>,
    {
        let explicit_batch_size = self
            .batch_size
            .map(|batch_size| {
                NonZeroUsize::new(batch_size).ok_or(BulkInsertError::InvalidBatchSize(batch_size))
            })
            .transpose()?;

        let template = ValuesTemplate::locate(self.sql)?;

        let row_fields = extractor.fields();
        let row_param_ends = template.row_param_ends(row_fields);

        let batch_size = explicit_batch_size.unwrap_or_else(|| {
            derive_batch_size(self.common_params.len(), row_fields.len())
        });

        debug!(
            tuple = template.tuple(),
            row_fields = row_fields.len(),
            row_params = row_param_ends.len(),
            common_params = self.common_params.len(),
            batch_size = batch_size.get(),
            "located bulk insert template"
        );

        Ok(BulkInsertCommands {
            template,
            common_params: self.common_params.clone(),
            extractor,
            row_param_ends,
            batches: RowBatches::new(rows.into_iter(), batch_size),
            batch_sql: Arc::from(""),
            last_batch_len: 0,
            batch_index: 0,
        })
    }
}

/// Prepares batches for rows without common parameters, deriving the batch
/// size.
pub fn bulk_insert_commands<I>(
    sql: &str,
    rows: I,
) -> BulkInsertResult<BulkInsertCommands<'_, I::IntoIter, SourceFields<I::Item>>>
where
    I: IntoIterator,
    I::Item: ParamSource,
{
    BulkInsert::new(sql).commands(rows)
}

fn derive_batch_size(common_param_count: usize, row_field_count: usize) -> NonZeroUsize {
    let rows_per_batch =
        MAX_PARAMS_PER_BATCH.saturating_sub(common_param_count) / row_field_count.max(1);
    NonZeroUsize::new(rows_per_batch).unwrap_or(NonZeroUsize::MIN)
}

/// Lazily produces one [`BatchCommand`] per batch of rows.
pub struct BulkInsertCommands<'a, I: Iterator, E> {
    template: ValuesTemplate<'a>,
    common_params: Vec<Param>,
    extractor: E,
    row_param_ends: Vec<usize>,
    batches: RowBatches<I>,
    batch_sql: Arc<str>,
    last_batch_len: usize,
    batch_index: usize,
}

impl<'a, I, E> BulkInsertCommands<'a, I, E>
where
    I: Iterator,
    E: FieldExtractor<I::Item>,
{
    pub fn template(&self) -> &ValuesTemplate<'a> {
        &self.template
    }

    /// Effective number of rows per batch.
    pub fn batch_size(&self) -> usize {
        self.batches.batch_size()
    }

    fn render_sql(&self, row_count: usize) -> String {
        let prefix = self.template.prefix();
        let tuple = self.template.tuple();
        let suffix = self.template.suffix();

        let mut batch_sql = String::with_capacity(
            prefix.len()
                + row_count * (1 + tuple.len() + self.row_param_ends.len() * 4)
                + suffix.len(),
        );
        batch_sql.push_str(prefix);

        for row_index in 0..row_count {
            if row_index != 0 {
                batch_sql.push(',');
            }

            let row_suffix = format!("_{row_index}");
            let mut tuple_offset = 0;
            for &param_end in &self.row_param_ends {
                batch_sql.push_str(&tuple[tuple_offset..param_end]);
                batch_sql.push_str(&row_suffix);
                tuple_offset = param_end;
            }
            batch_sql.push_str(&tuple[tuple_offset..]);
        }

        batch_sql.push_str(suffix);
        batch_sql
    }

    fn batch_params(&self, rows: &[I::Item]) -> Vec<Param> {
        let row_fields = self.extractor.fields();

        let mut params =
            Vec::with_capacity(self.common_params.len() + row_fields.len() * rows.len());
        params.extend(self.common_params.iter().cloned());

        for (row_index, row) in rows.iter().enumerate() {
            let row_values = self.extractor.values(row);
            params.extend(
                row_fields
                    .names()
                    .iter()
                    .zip(row_values)
                    .map(|(name, value)| Param {
                        name: format!("{name}_{row_index}"),
                        value,
                    }),
            );
        }
        params
    }
}

impl<I, E> Iterator for BulkInsertCommands<'_, I, E>
where
    I: Iterator,
    E: FieldExtractor<I::Item>,
{
    type Item = BatchCommand;

    fn next(&mut self) -> Option<Self::Item> {
        let rows = self.batches.next()?;
        let row_count = rows.len();

        // Batches never hold zero rows, so an empty `last_batch_len` means
        // nothing has been rendered yet.
        if row_count != self.last_batch_len {
            self.batch_sql = Arc::from(self.render_sql(row_count));
            self.last_batch_len = row_count;
        }

        let params = self.batch_params(&rows);
        trace!(
            batch_index = self.batch_index,
            row_count,
            param_count = params.len(),
            "produced bulk insert batch"
        );
        self.batch_index += 1;

        Some(BatchCommand {
            sql: Arc::clone(&self.batch_sql),
            params,
            row_count,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.batches.size_hint()
    }
}

impl<I, E> std::iter::FusedIterator for BulkInsertCommands<'_, I, E>
where
    I: Iterator,
    E: FieldExtractor<I::Item>,
{
}
