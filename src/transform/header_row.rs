//! Header row transformer
//!
//! Turns positional CSV rows into keyed records using the first row as
//! field names.

use crate::etl::Transformer;
use crate::record::{Outcome, Record, scalar_text};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Transformer that names columns after the first row
///
/// The first record is captured as the header and dropped. Each later
/// positional record becomes an object keyed by the header; short rows get
/// `null` for the missing columns, and extra columns or repeats of an
/// earlier header name are keyed by their position. Keyed records pass
/// through unchanged.
#[derive(Debug, Default, Clone)]
pub struct HeaderRow {
    names: Vec<String>,
}

impl HeaderRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column names captured from the last first record
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Transformer for HeaderRow {
    fn configure_item(&mut self, record: Record) -> Outcome {
        let fields = match record {
            Value::Array(fields) => fields,
            keyed => return Outcome::Keep(keyed),
        };

        let width = fields.len().max(self.names.len());
        let mut fields = fields.into_iter();
        let mut keyed = Map::new();
        for index in 0..width {
            let name = self
                .names
                .get(index)
                .cloned()
                .unwrap_or_else(|| index.to_string());
            keyed.insert(name, fields.next().unwrap_or(Value::Null));
        }
        Outcome::Keep(Value::Object(keyed))
    }

    fn configure_first_item(&mut self, record: Record) -> Outcome {
        self.names = match &record {
            Value::Array(fields) => {
                unique_names(fields.iter().map(|f| scalar_text(f).trim().to_string()))
            }
            Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        };
        log::debug!("Captured header columns {:?}", self.names);
        Outcome::Drop
    }
}

/// Repeated names lose to the first column that used them
fn unique_names(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .enumerate()
        .map(|(index, name)| {
            if seen.insert(name.clone()) {
                name
            } else {
                index.to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_become_objects() {
        let mut transformer = HeaderRow::new();
        let output = transformer.transform_many(vec![
            json!(["name", " age "]),
            json!(["John", "30"]),
            json!(["Jane"]),
            json!(["Max", "40", "extra"]),
        ]);

        assert_eq!(transformer.names(), &["name", "age"]);
        assert_eq!(
            output,
            vec![
                json!({"name": "John", "age": "30"}),
                json!({"name": "Jane", "age": null}),
                json!({"name": "Max", "age": "40", "2": "extra"}),
            ]
        );
    }

    #[test]
    fn test_keyed_records_pass_through() {
        let mut transformer = HeaderRow::new();
        let output = transformer.transform_many(vec![json!({"h": 1}), json!({"a": 2})]);
        assert_eq!(output, vec![json!({"a": 2})]);
    }

    #[test]
    fn test_duplicate_header_keeps_every_column() {
        let mut transformer = HeaderRow::new();
        let output =
            transformer.transform_many(vec![json!(["a", "a", "b"]), json!(["1", "2", "3"])]);

        assert_eq!(transformer.names(), &["a", "1", "b"]);
        assert_eq!(output, vec![json!({"a": "1", "1": "2", "b": "3"})]);
    }
}
