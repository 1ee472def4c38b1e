//! Transformer trait for per-record transformation

use crate::record::{Outcome, Record, RecordSequence};

/// Transformer trait for transforming records one at a time
///
/// The first record of a source goes to [`configure_first_item`], every
/// later record goes to [`configure_item`]. Both return an [`Outcome`], so
/// any record can be dropped; the canonical use of the first-record hook
/// is discarding a header row.
///
/// Implementations may keep mutable state (counters, a captured header)
/// between calls. One transformer instance serves one `apply` at a time.
///
/// # Example
/// ```
/// use record_pipeline::etl::Transformer;
/// use record_pipeline::record::{Outcome, Record};
///
/// struct Uppercase;
///
/// impl Transformer for Uppercase {
///     fn configure_item(&mut self, record: Record) -> Outcome {
///         match record.as_str() {
///             Some(s) => Outcome::Keep(s.to_uppercase().into()),
///             None => Outcome::Drop,
///         }
///     }
///
///     fn configure_first_item(&mut self, _record: Record) -> Outcome {
///         Outcome::Drop
///     }
/// }
/// ```
///
/// [`configure_first_item`]: Transformer::configure_first_item
/// [`configure_item`]: Transformer::configure_item
pub trait Transformer {
    /// Transform or reject a record at index 1 or later
    fn configure_item(&mut self, record: Record) -> Outcome;

    /// Transform or reject the record at index 0
    fn configure_first_item(&mut self, record: Record) -> Outcome;

    /// Thread a whole sequence through the transformer
    ///
    /// Source order is preserved and dropped records are left out.
    fn transform_many(&mut self, records: RecordSequence) -> RecordSequence {
        let mut sink = RecordSink::new(self);
        for record in records {
            sink.push(record);
        }
        sink.finish()
    }
}

impl<T: Transformer + ?Sized> Transformer for &mut T {
    fn configure_item(&mut self, record: Record) -> Outcome {
        (**self).configure_item(record)
    }

    fn configure_first_item(&mut self, record: Record) -> Outcome {
        (**self).configure_first_item(record)
    }
}

impl<T: Transformer + ?Sized> Transformer for Box<T> {
    fn configure_item(&mut self, record: Record) -> Outcome {
        (**self).configure_item(record)
    }

    fn configure_first_item(&mut self, record: Record) -> Outcome {
        (**self).configure_first_item(record)
    }
}

/// Accumulates decoded records, routing each through a transformer
///
/// Readers push raw records in source order as they decode them. The
/// first push goes through the first-record hook. Nothing is visible to
/// the caller until [`finish`](RecordSink::finish), so a reader that fails
/// half way simply drops the sink and no partial sequence escapes.
pub struct RecordSink<'t, T: Transformer + ?Sized> {
    transformer: &'t mut T,
    seen: usize,
    records: RecordSequence,
}

impl<'t, T: Transformer + ?Sized> RecordSink<'t, T> {
    pub fn new(transformer: &'t mut T) -> Self {
        Self {
            transformer,
            seen: 0,
            records: Vec::new(),
        }
    }

    /// Hand one raw record to the transformer
    pub fn push(&mut self, record: Record) {
        let outcome = if self.seen == 0 {
            self.transformer.configure_first_item(record)
        } else {
            self.transformer.configure_item(record)
        };
        self.seen += 1;

        if let Outcome::Keep(record) = outcome {
            self.records.push(record);
        }
    }

    /// Number of raw records pushed so far, kept or not
    pub fn seen(&self) -> usize {
        self.seen
    }

    pub fn finish(self) -> RecordSequence {
        log::debug!(
            "Transformed {} raw records into {} items",
            self.seen,
            self.records.len()
        );
        self.records
    }
}

/// Identity transformer that keeps every record unchanged
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityTransformer;

impl IdentityTransformer {
    pub fn new() -> Self {
        Self
    }
}

impl Transformer for IdentityTransformer {
    fn configure_item(&mut self, record: Record) -> Outcome {
        Outcome::Keep(record)
    }

    fn configure_first_item(&mut self, record: Record) -> Outcome {
        Outcome::Keep(record)
    }
}
