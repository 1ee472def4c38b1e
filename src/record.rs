//! Record model shared by every stage of the pipeline
//!
//! A [`Record`] is a JSON value. Keyed sources (JSON, XML) produce objects
//! whose keys keep their source order; positional sources (CSV) produce
//! arrays of strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One decoded unit of source data
pub type Record = Value;

/// The ordered records produced by one `apply` call
pub type RecordSequence = Vec<Record>;

/// Result of handing one record to a transformer
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Append this record to the output
    Keep(Record),
    /// Exclude the record from the output
    Drop,
}

impl Outcome {
    pub fn is_drop(&self) -> bool {
        matches!(self, Outcome::Drop)
    }

    /// The kept record, if any
    pub fn into_record(self) -> Option<Record> {
        match self {
            Outcome::Keep(record) => Some(record),
            Outcome::Drop => None,
        }
    }
}

impl From<Record> for Outcome {
    fn from(record: Record) -> Self {
        Outcome::Keep(record)
    }
}

/// Address of a field inside a record
///
/// Names address object fields, indices address positions in array
/// records. A name made only of digits also addresses the array position
/// it spells, so `"0"` and `0` read the same CSV column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordKey {
    Index(usize),
    Name(String),
}

impl RecordKey {
    /// Look the key up in a record
    pub fn get<'a>(&self, record: &'a Record) -> Option<&'a Value> {
        match (self, record) {
            (RecordKey::Name(name), Value::Object(map)) => map.get(name),
            (RecordKey::Index(index), Value::Object(map)) => map.get(&index.to_string()),
            (RecordKey::Index(index), Value::Array(items)) => items.get(*index),
            (RecordKey::Name(name), Value::Array(items)) => {
                name.parse::<usize>().ok().and_then(|i| items.get(i))
            }
            _ => None,
        }
    }

    /// The key as an object field name
    pub fn as_field_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Index(index) => write!(f, "{}", index),
            RecordKey::Name(name) => write!(f, "{}", name),
        }
    }
}

impl From<&str> for RecordKey {
    fn from(name: &str) -> Self {
        RecordKey::Name(name.to_string())
    }
}

impl From<String> for RecordKey {
    fn from(name: String) -> Self {
        RecordKey::Name(name)
    }
}

impl From<usize> for RecordKey {
    fn from(index: usize) -> Self {
        RecordKey::Index(index)
    }
}

/// Keys of a record in order: field names for objects, positions for arrays
///
/// Scalars have no keys.
pub fn keys_of(record: &Record) -> Vec<RecordKey> {
    match record {
        Value::Object(map) => map.keys().cloned().map(RecordKey::Name).collect(),
        Value::Array(items) => (0..items.len()).map(RecordKey::Index).collect(),
        _ => Vec::new(),
    }
}

/// Render a scalar as plain text; nested values become compact JSON
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        nested => nested.to_string(),
    }
}
