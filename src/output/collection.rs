//! Run-scoped record accumulator

use crate::output::sink::{OutputResult, RecordSink};
use crate::record::Record;

/// Ordered, append-only set of records gathered during one run
///
/// Records keep first-seen order; duplicates across pages are kept as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    records: Vec<Record>,
    batches: usize,
}

impl Collection {
    /// Creates an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one page's records after everything already collected
    pub fn append_batch(&mut self, batch: Vec<Record>) {
        self.records.extend(batch);
        self.batches += 1;
    }

    /// Number of records collected so far
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of batches appended so far
    pub fn batches(&self) -> usize {
        self.batches
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Writes every record to the sink in one call and returns the count
    ///
    /// Consumes the collection; nothing can be appended after the flush.
    pub fn flush(self, sink: &dyn RecordSink) -> OutputResult<usize> {
        sink.write_records(&self.records)?;
        Ok(self.records.len())
    }
}
