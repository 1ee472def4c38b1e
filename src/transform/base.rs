//! Reusable building blocks for concrete transformers
//!
//! [`RecordConfigurator`] bundles a [`FieldMapping`] and a
//! [`ValidatorChain`]; transformers call its [`map_fields`] and
//! [`validate_item`] helpers from their own `configure_*` methods.
//!
//! [`map_fields`]: RecordConfigurator::map_fields
//! [`validate_item`]: RecordConfigurator::validate_item

use crate::record::{Record, RecordKey};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Ordered mapping from source keys to destination field names
///
/// An empty mapping is the identity. Otherwise the mapped record holds
/// exactly the destination fields, in mapping order: source keys that are
/// not mapped are dropped, and a mapped key missing from the source yields
/// a `null` field.
///
/// In configuration files a mapping is a list of `[source, destination]`
/// pairs, where a numeric source addresses a CSV column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    pairs: Vec<(RecordKey, String)>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source to destination pair
    pub fn map(mut self, source: impl Into<RecordKey>, destination: impl Into<String>) -> Self {
        self.pairs.push((source.into(), destination.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Apply the mapping to one record
    pub fn apply(&self, record: Record) -> Record {
        if self.pairs.is_empty() {
            return record;
        }

        let mut mapped = Map::new();
        for (source, destination) in &self.pairs {
            let value = source.get(&record).cloned().unwrap_or(Value::Null);
            mapped.insert(destination.clone(), value);
        }
        Value::Object(mapped)
    }
}

impl<K: Into<RecordKey>, D: Into<String>> FromIterator<(K, D)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (K, D)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, d)| (k.into(), d.into()))
                .collect(),
        }
    }
}

/// A predicate over one record
pub type Predicate = Box<dyn Fn(&Record) -> bool>;

/// Ordered list of named predicates
///
/// A record is valid when every predicate accepts it. Predicates run in
/// insertion order and evaluation stops at the first rejection.
#[derive(Default)]
pub struct ValidatorChain {
    validators: Vec<(String, Predicate)>,
}

impl ValidatorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a predicate; the name shows up in logs when it rejects a record
    pub fn with(
        mut self,
        name: impl Into<String>,
        predicate: impl Fn(&Record) -> bool + 'static,
    ) -> Self {
        self.push(name, predicate);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, predicate: impl Fn(&Record) -> bool + 'static) {
        self.validators.push((name.into(), Box::new(predicate)));
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Name of the first predicate that rejects the record
    pub fn first_failure(&self, record: &Record) -> Option<&str> {
        self.validators
            .iter()
            .find(|(_, predicate)| !predicate(record))
            .map(|(name, _)| name.as_str())
    }

    /// True when the chain is empty or every predicate accepts the record
    pub fn validate(&self, record: &Record) -> bool {
        self.first_failure(record).is_none()
    }
}

impl fmt::Debug for ValidatorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.validators.iter().map(|(name, _)| name))
            .finish()
    }
}

/// Field mapping plus validation, shared by concrete transformers
#[derive(Debug, Default)]
pub struct RecordConfigurator {
    mapping: FieldMapping,
    validators: ValidatorChain,
}

impl RecordConfigurator {
    pub fn new(mapping: FieldMapping, validators: ValidatorChain) -> Self {
        Self {
            mapping,
            validators,
        }
    }

    pub fn with_mapping(mut self, mapping: FieldMapping) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn with_validators(mut self, validators: ValidatorChain) -> Self {
        self.validators = validators;
        self
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    pub fn validators(&self) -> &ValidatorChain {
        &self.validators
    }

    /// Rename fields through the mapping; identity when it is empty
    pub fn map_fields(&self, record: Record) -> Record {
        self.mapping.apply(record)
    }

    /// Run the validator chain over a record
    pub fn validate_item(&self, record: &Record) -> bool {
        self.validators.validate(record)
    }
}
