use std::num::NonZeroUsize;

/// Splits a row stream into ordered batches of at most `batch_size` rows.
///
/// Only one batch is buffered at a time. Every batch but the last is full,
/// and an empty stream yields no batch at all.
#[derive(Debug)]
pub struct RowBatches<I> {
    rows: I,
    batch_size: usize,
    next_capacity: usize,
    exhausted: bool,
}

impl<I: Iterator> RowBatches<I> {
    pub fn new(rows: I, batch_size: NonZeroUsize) -> Self {
        let batch_size = batch_size.get();
        let (lower_bound, upper_bound) = rows.size_hint();

        // A stream known to fit in one batch is collected in a single pass,
        // and a stream known to be empty is never polled.
        let (next_capacity, exhausted) = match upper_bound {
            Some(known_len) if known_len == lower_bound && known_len <= batch_size => {
                (known_len, known_len == 0)
            }
            _ => (batch_size, false),
        };

        Self {
            rows,
            batch_size,
            next_capacity,
            exhausted,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl<I: Iterator> Iterator for RowBatches<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let mut batch = Vec::with_capacity(self.next_capacity);
        batch.extend(self.rows.by_ref().take(self.batch_size));

        if batch.len() < self.batch_size {
            self.exhausted = true;
        }
        if batch.is_empty() {
            return None;
        }
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted {
            return (0, Some(0));
        }
        let (lower_bound, upper_bound) = self.rows.size_hint();
        (
            lower_bound.div_ceil(self.batch_size),
            upper_bound.map(|upper| upper.div_ceil(self.batch_size)),
        )
    }
}

impl<I: Iterator> std::iter::FusedIterator for RowBatches<I> {}

/// Convenience wrapper over [`RowBatches::new`].
pub fn batch_rows<R>(rows: R, batch_size: NonZeroUsize) -> RowBatches<R::IntoIter>
where
    R: IntoIterator,
{
    RowBatches::new(rows.into_iter(), batch_size)
}
