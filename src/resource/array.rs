//! In-memory resource

use crate::error::Result;
use crate::etl::{RecordSink, Resource, Transformer};
use crate::record::{Record, RecordSequence};

/// Resource over a caller-supplied sequence of records
///
/// The backing records are never modified, so repeated `apply` calls see
/// the same input.
#[derive(Debug, Clone, Default)]
pub struct ArrayData {
    source: Vec<Record>,
    data: RecordSequence,
}

impl ArrayData {
    pub fn new(source: Vec<Record>) -> Self {
        Self {
            source,
            data: Vec::new(),
        }
    }

    /// The untransformed backing records
    pub fn source(&self) -> &[Record] {
        &self.source
    }
}

impl From<Vec<Record>> for ArrayData {
    fn from(source: Vec<Record>) -> Self {
        Self::new(source)
    }
}

impl Resource for ArrayData {
    fn apply(&mut self, transformer: &mut dyn Transformer) -> Result<RecordSequence> {
        let mut sink = RecordSink::new(transformer);
        for record in &self.source {
            sink.push(record.clone());
        }
        let items = sink.finish();

        self.data = items.clone();
        Ok(items)
    }

    fn data(&self) -> &[Record] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::etl::IdentityTransformer;
    use crate::record::Outcome;
    use serde_json::{Value, json};

    struct SkipHeader;

    impl Transformer for SkipHeader {
        fn configure_item(&mut self, record: Record) -> Outcome {
            Outcome::Keep(json!({ "value": record }))
        }

        fn configure_first_item(&mut self, _record: Record) -> Outcome {
            Outcome::Drop
        }
    }

    #[test]
    fn test_apply_preserves_order() {
        let source: Vec<Value> = (0..5).map(|n| json!({ "n": n })).collect();
        let mut resource = ArrayData::new(source.clone());

        let items = resource.apply(&mut IdentityTransformer).unwrap();
        assert_eq!(items, source);
        assert_eq!(resource.data(), source.as_slice());
    }

    #[test]
    fn test_first_record_drop() {
        let mut resource = ArrayData::new(vec![json!("header"), json!(1), json!(2)]);
        let items = resource.apply(&mut SkipHeader).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0], json!({ "value": 1 }));
    }

    #[test]
    fn test_data_holds_last_result_only() {
        let mut resource = ArrayData::new(vec![json!(1), json!(2)]);
        assert!(resource.data().is_empty());

        resource.apply(&mut IdentityTransformer).unwrap();
        resource.apply(&mut SkipHeader).unwrap();

        assert_eq!(resource.data(), &[json!({ "value": 2 })]);
        assert_eq!(resource.source().len(), 2);
    }
}
