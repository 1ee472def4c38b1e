//! Header-skipping wrapper

use crate::etl::Transformer;
use crate::record::{Outcome, Record};

/// Drops the first record and hands every later one to `inner`
#[derive(Debug, Default, Clone)]
pub struct SkipFirst<T> {
    inner: T,
}

impl<T: Transformer> SkipFirst<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Transformer> Transformer for SkipFirst<T> {
    fn configure_item(&mut self, record: Record) -> Outcome {
        self.inner.configure_item(record)
    }

    fn configure_first_item(&mut self, _record: Record) -> Outcome {
        Outcome::Drop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::etl::IdentityTransformer;
    use serde_json::json;

    #[test]
    fn test_first_record_dropped() {
        let mut transformer = SkipFirst::new(IdentityTransformer);
        let output = transformer.transform_many(vec![json!(["id"]), json!(["1"]), json!(["2"])]);
        assert_eq!(output, vec![json!(["1"]), json!(["2"])]);
    }

    #[test]
    fn test_single_record_source() {
        let mut transformer = SkipFirst::new(IdentityTransformer);
        assert!(transformer.transform_many(vec![json!(["id"])]).is_empty());
    }
}
