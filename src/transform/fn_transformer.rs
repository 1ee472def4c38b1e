//! Closure-backed transformer

use crate::etl::Transformer;
use crate::record::{Outcome, Record};

/// Transformer that runs a closure over every record, the first included
///
/// Wrap it in [`SkipFirst`](super::SkipFirst) to drop a header.
///
/// # Example
/// ```
/// use record_pipeline::etl::Transformer;
/// use record_pipeline::record::Outcome;
/// use record_pipeline::transform::FnTransformer;
/// use serde_json::json;
///
/// let mut transformer = FnTransformer::new(|mut record| {
///     record["seen"] = json!(true);
///     Outcome::Keep(record)
/// });
/// let items = transformer.transform_many(vec![json!({"id": 1})]);
/// assert_eq!(items, vec![json!({"id": 1, "seen": true})]);
/// ```
pub struct FnTransformer<F> {
    f: F,
}

impl<F> FnTransformer<F>
where
    F: FnMut(Record) -> Outcome,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Transformer for FnTransformer<F>
where
    F: FnMut(Record) -> Outcome,
{
    fn configure_item(&mut self, record: Record) -> Outcome {
        (self.f)(record)
    }

    fn configure_first_item(&mut self, record: Record) -> Outcome {
        (self.f)(record)
    }
}
