//! JSON reading and writing

use super::{FormatReader, read_text};
use crate::error::{EtlError, Result};
use crate::etl::{OutputFormatter, RecordSink, Transformer};
use crate::record::{Record, RecordSequence};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Read;

/// Decode a JSON array into records
///
/// The whole stream must be one JSON array whose elements are objects or
/// arrays. Each element becomes one record, in array order.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReader;

impl JsonReader {
    pub fn new() -> Self {
        Self
    }
}

impl FormatReader for JsonReader {
    fn read(
        &self,
        input: &mut dyn Read,
        transformer: &mut dyn Transformer,
    ) -> Result<RecordSequence> {
        let text = read_text(input, "JSON")?;
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| EtlError::resource_with("Failed to parse JSON", e))?;

        let elements = match value {
            Value::Array(elements) => elements,
            other => {
                return Err(EtlError::resource(format!(
                    "Expected a JSON array at the top level, found {}",
                    type_name(&other)
                )));
            }
        };

        if let Some((i, element)) = elements
            .iter()
            .enumerate()
            .find(|(_, e)| !e.is_object() && !e.is_array())
        {
            return Err(EtlError::resource(format!(
                "JSON element #{} is {}, expected an object or array",
                i + 1,
                type_name(element)
            )));
        }

        let mut sink = RecordSink::new(transformer);
        for element in elements {
            sink.push(element);
        }
        log::debug!("Decoded {} JSON elements", sink.seen());
        Ok(sink.finish())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Layout settings for [`JsonFormatter`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonOptions {
    /// Pretty-print with newlines and indentation
    pub pretty: bool,
    /// Spaces per indentation level when pretty-printing
    pub indent: usize,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: 4,
        }
    }
}

/// Serialize records as one JSON array
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    options: JsonOptions,
}

impl JsonFormatter {
    /// Compact output
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(options: JsonOptions) -> Self {
        Self { options }
    }

    pub fn pretty(mut self) -> Self {
        self.options.pretty = true;
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.options.indent = indent;
        self
    }
}

impl OutputFormatter for JsonFormatter {
    fn serialize(&self, records: &[Record]) -> Result<String> {
        let bytes = if self.options.pretty {
            let indent = " ".repeat(self.options.indent);
            let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
            let mut buffer = Vec::new();
            let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
            records
                .serialize(&mut serializer)
                .map_err(|e| EtlError::output_with("Failed to encode records as JSON", e))?;
            buffer
        } else {
            serde_json::to_vec(records)
                .map_err(|e| EtlError::output_with("Failed to encode records as JSON", e))?
        };

        String::from_utf8(bytes).map_err(|e| EtlError::output_with("JSON output is not UTF-8", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::etl::IdentityTransformer;
    use crate::record::Outcome;
    use serde_json::json;

    struct Counting(usize);

    impl Transformer for Counting {
        fn configure_item(&mut self, record: Record) -> Outcome {
            self.0 += 1;
            Outcome::Keep(record)
        }

        fn configure_first_item(&mut self, record: Record) -> Outcome {
            self.configure_item(record)
        }
    }

    #[test]
    fn test_read_array_of_objects() {
        let input = r#"[{"b": 1, "a": 2}, [1, 2], {"nested": {"x": true}}]"#;
        let records = JsonReader::new()
            .read_str(input, &mut IdentityTransformer)
            .unwrap();

        assert_eq!(records.len(), 3);
        let keys: Vec<&String> = records[0].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(records[2]["nested"]["x"], json!(true));
    }

    #[test]
    fn test_read_malformed() {
        let mut transformer = Counting(0);
        let err = JsonReader::new()
            .read_str("{invalid", &mut transformer)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Resource);
        assert_eq!(transformer.0, 0);
    }

    #[test]
    fn test_read_requires_top_level_array() {
        let err = JsonReader::new()
            .read_str(r#"{"a": 1}"#, &mut IdentityTransformer)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Resource error: Expected a JSON array at the top level, found an object"
        );
    }

    #[test]
    fn test_read_rejects_scalar_elements_before_transforming() {
        let mut transformer = Counting(0);
        let err = JsonReader::new()
            .read_str(r#"[{"a": 1}, 2]"#, &mut transformer)
            .unwrap_err();

        assert!(err.to_string().contains("#2 is a number"));
        assert_eq!(transformer.0, 0);
    }

    #[test]
    fn test_write_compact() {
        let records = vec![json!({"name": "John", "age": 30})];
        let output = JsonFormatter::new().serialize(&records).unwrap();
        assert_eq!(output, r#"[{"name":"John","age":30}]"#);
    }

    #[test]
    fn test_write_pretty() {
        let records = vec![json!({"id": 1})];
        let output = JsonFormatter::new()
            .pretty()
            .with_indent(2)
            .serialize(&records)
            .unwrap();
        assert_eq!(output, "[\n  {\n    \"id\": 1\n  }\n]");
    }

    #[test]
    fn test_write_empty() {
        assert_eq!(JsonFormatter::new().serialize(&[]).unwrap(), "[]");
        assert_eq!(JsonFormatter::new().pretty().serialize(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_write_is_repeatable() {
        let records = vec![json!({"z": 1, "a": [1, 2]}), json!({"k": null})];
        let formatter = JsonFormatter::new().pretty();
        assert_eq!(
            formatter.serialize(&records).unwrap(),
            formatter.serialize(&records).unwrap()
        );
    }
}
