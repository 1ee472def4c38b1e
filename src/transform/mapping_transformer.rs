//! Mapping and validating transformer
//!
//! Renames fields through a [`FieldMapping`] and drops records that fail a
//! [`ValidatorChain`], keeping counts of what it saw.

use super::{FieldMapping, RecordConfigurator, ValidatorChain};
use crate::etl::Transformer;
use crate::record::{Outcome, Record};
use serde::Serialize;

/// Counts kept by [`MappingTransformer`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationStats {
    /// Records that went through mapping and validation
    pub processed: usize,
    pub valid: usize,
    pub invalid: usize,
    /// First records dropped as headers without validation
    pub skipped: usize,
}

/// Transformer that maps fields and drops invalid records
///
/// # Example
/// ```
/// use record_pipeline::etl::Transformer;
/// use record_pipeline::transform::{validators, FieldMapping, MappingTransformer, ValidatorChain};
/// use serde_json::json;
///
/// let mut transformer = MappingTransformer::new(
///     FieldMapping::new().map(0usize, "name").map(1usize, "age"),
///     ValidatorChain::new().with("age is numeric", validators::numeric("age")),
/// )
/// .skip_first();
///
/// let rows = vec![json!(["name", "age"]), json!(["John", "30"]), json!(["Jane", "?"])];
/// let items = transformer.transform_many(rows);
///
/// assert_eq!(items, vec![json!({"name": "John", "age": "30"})]);
/// assert_eq!(transformer.stats().invalid, 1);
/// ```
#[derive(Debug, Default)]
pub struct MappingTransformer {
    base: RecordConfigurator,
    skip_first: bool,
    stats: ValidationStats,
}

impl MappingTransformer {
    pub fn new(mapping: FieldMapping, validators: ValidatorChain) -> Self {
        Self {
            base: RecordConfigurator::new(mapping, validators),
            skip_first: false,
            stats: ValidationStats::default(),
        }
    }

    /// Drop the first record unseen, as a header row
    pub fn skip_first(mut self) -> Self {
        self.skip_first = true;
        self
    }

    pub fn stats(&self) -> ValidationStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = ValidationStats::default();
    }

    pub fn configurator(&self) -> &RecordConfigurator {
        &self.base
    }
}

impl Transformer for MappingTransformer {
    fn configure_item(&mut self, record: Record) -> Outcome {
        self.stats.processed += 1;
        let mapped = self.base.map_fields(record);

        match self.base.validators().first_failure(&mapped) {
            None => {
                self.stats.valid += 1;
                Outcome::Keep(mapped)
            }
            Some(validator) => {
                self.stats.invalid += 1;
                log::debug!("Dropping record rejected by '{}': {}", validator, mapped);
                Outcome::Drop
            }
        }
    }

    fn configure_first_item(&mut self, record: Record) -> Outcome {
        if self.skip_first {
            self.stats.skipped += 1;
            return Outcome::Drop;
        }
        self.configure_item(record)
    }
}
