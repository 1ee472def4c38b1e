//! OutputFormatter trait for serializing records

use crate::error::{EtlError, Result};
use crate::record::Record;
use std::io::Write;

/// OutputFormatter trait for turning a record sequence into text
///
/// Implementors define one output representation:
/// - JSON arrays
/// - XML documents
/// - CSV tables
///
/// Serializing the same records twice with the same formatter yields
/// identical output.
pub trait OutputFormatter {
    /// Serialize all records
    ///
    /// # Errors
    /// Returns an output error if any record cannot be represented. No
    /// partial output is returned.
    fn serialize(&self, records: &[Record]) -> Result<String>;

    /// Serialize all records into a writer
    ///
    /// The payload is built in full before anything is written.
    fn write_to(&self, records: &[Record], writer: &mut dyn Write) -> Result<usize> {
        let payload = self.serialize(records)?;
        writer
            .write_all(payload.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| EtlError::output_with("Failed to write serialized records", e))?;
        Ok(payload.len())
    }
}

impl<F: OutputFormatter + ?Sized> OutputFormatter for Box<F> {
    fn serialize(&self, records: &[Record]) -> Result<String> {
        (**self).serialize(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct CountFormatter;

    impl OutputFormatter for CountFormatter {
        fn serialize(&self, records: &[Record]) -> Result<String> {
            Ok(records.len().to_string())
        }
    }

    #[test]
    fn test_write_to_writer() {
        let mut buffer = Vec::new();
        let written = CountFormatter
            .write_to(&[json!(1), json!(2)], &mut buffer)
            .unwrap();

        assert_eq!(written, 1);
        assert_eq!(buffer, b"2");
    }
}
