//! Resource trait for producing records from a backing store

use super::Transformer;
use crate::error::Result;
use crate::record::{Record, RecordSequence};

/// Resource trait for producing a record sequence
///
/// Implementors define where records come from:
/// - In-memory arrays
/// - Files decoded by a [`FormatReader`](crate::storage::FormatReader)
///
/// Every record is threaded through the supplied transformer on the way
/// out. The produced sequence is also kept inside the resource and is
/// available from [`data`](Resource::data) until the next `apply`
/// replaces it; results are never merged across calls.
///
/// A resource keeps that last result in a plain field, so one instance
/// serves one `apply` at a time. Callers that need concurrency use one
/// resource per call.
///
/// # Example
/// ```
/// use record_pipeline::etl::{IdentityTransformer, Resource};
/// use record_pipeline::resource::ArrayData;
/// use serde_json::json;
///
/// let mut resource = ArrayData::new(vec![json!({"id": 1}), json!({"id": 2})]);
/// let items = resource.apply(&mut IdentityTransformer).unwrap();
/// assert_eq!(items.len(), 2);
/// assert_eq!(resource.data(), items.as_slice());
/// ```
pub trait Resource {
    /// Produce the transformed record sequence
    ///
    /// # Errors
    /// Returns a resource error if the source cannot be opened, read or
    /// decoded. On error no records are returned and the previously
    /// retained sequence is left untouched.
    fn apply(&mut self, transformer: &mut dyn Transformer) -> Result<RecordSequence>;

    /// The sequence produced by the most recent successful `apply`
    fn data(&self) -> &[Record];
}

impl<R: Resource + ?Sized> Resource for Box<R> {
    fn apply(&mut self, transformer: &mut dyn Transformer) -> Result<RecordSequence> {
        (**self).apply(transformer)
    }

    fn data(&self) -> &[Record] {
        (**self).data()
    }
}
