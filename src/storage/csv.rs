//! CSV reading and writing

use super::{FormatReader, ascii_byte};
use crate::error::{EtlError, Result};
use crate::etl::{OutputFormatter, RecordSink, Transformer};
use crate::record::{Record, RecordSequence, keys_of, scalar_text};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Read;

/// Dialect settings shared by [`CsvReader`] and [`CsvFormatter`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Field separator
    pub delimiter: char,
    /// Enclosure character for fields holding delimiters or newlines
    pub quote: char,
    /// Escape character inside quoted fields; doubled quotes when unset
    pub escape: Option<char>,
    /// Whether the formatter emits a header row (the reader always
    /// returns the first line as the first record)
    pub has_headers: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: '"',
            escape: None,
            has_headers: true,
        }
    }
}

/// Decode CSV lines into positional records
///
/// Each row becomes an array of strings. Quoted fields may contain the
/// delimiter or line breaks. Rows may differ in width and blank lines are
/// skipped. The first row, usually a header, is the first record.
#[derive(Debug, Clone, Default)]
pub struct CsvReader {
    options: CsvOptions,
}

impl CsvReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(options: CsvOptions) -> Self {
        Self { options }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.options.delimiter = delimiter;
        self
    }

    pub fn with_quote(mut self, quote: char) -> Self {
        self.options.quote = quote;
        self
    }

    pub fn with_escape(mut self, escape: char) -> Self {
        self.options.escape = Some(escape);
        self
    }

    fn builder(&self) -> Result<csv::ReaderBuilder> {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(ascii_byte(self.options.delimiter, "CSV delimiter")?)
            .quote(ascii_byte(self.options.quote, "CSV quote")?);
        if let Some(escape) = self.options.escape {
            builder
                .escape(Some(ascii_byte(escape, "CSV escape")?))
                .double_quote(false);
        }
        Ok(builder)
    }
}

impl FormatReader for CsvReader {
    fn read(
        &self,
        input: &mut dyn Read,
        transformer: &mut dyn Transformer,
    ) -> Result<RecordSequence> {
        let mut reader = self.builder()?.from_reader(input);
        let mut sink = RecordSink::new(transformer);

        for (i, row) in reader.records().enumerate() {
            let row = row.map_err(|e| {
                EtlError::resource_with(format!("Failed to parse CSV record #{}", i + 1), e)
            })?;
            let fields = row.iter().map(|f| Value::String(f.to_string())).collect();
            sink.push(Value::Array(fields));
        }

        log::debug!("Decoded {} CSV rows", sink.seen());
        Ok(sink.finish())
    }
}

/// Serialize records as a CSV table
///
/// The header row and the column order come from the keys of the first
/// record. Every later record is written against those same keys; fields
/// it lacks are left empty and keys it adds are not written. Nested values
/// are written as compact JSON. An empty sequence produces an empty string.
#[derive(Debug, Clone, Default)]
pub struct CsvFormatter {
    options: CsvOptions,
}

impl CsvFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(options: CsvOptions) -> Self {
        Self { options }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.options.delimiter = delimiter;
        self
    }

    pub fn with_quote(mut self, quote: char) -> Self {
        self.options.quote = quote;
        self
    }

    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.options.has_headers = has_headers;
        self
    }
}

impl OutputFormatter for CsvFormatter {
    fn serialize(&self, records: &[Record]) -> Result<String> {
        let Some(first) = records.first() else {
            return Ok(String::new());
        };

        if !first.is_object() && !first.is_array() {
            return Err(EtlError::output(
                "CSV output needs keyed or positional records, first record is a scalar",
            ));
        }
        let keys = keys_of(first);
        if keys.is_empty() {
            return Err(EtlError::output(
                "CSV output needs at least one column, first record has no fields",
            ));
        }

        let mut writer = csv::WriterBuilder::new()
            .delimiter(ascii_byte(self.options.delimiter, "CSV delimiter")?)
            .quote(ascii_byte(self.options.quote, "CSV quote")?)
            .terminator(csv::Terminator::Any(b'\n'))
            .flexible(true)
            .from_writer(Vec::new());

        if self.options.has_headers {
            writer
                .write_record(keys.iter().map(|k| k.to_string()))
                .map_err(|e| EtlError::output_with("Failed to write CSV header", e))?;
        }

        for (i, record) in records.iter().enumerate() {
            if !record.is_object() && !record.is_array() {
                return Err(EtlError::output(format!(
                    "CSV record #{} is a scalar, expected an object or array",
                    i + 1
                )));
            }
            let row: Vec<String> = keys
                .iter()
                .map(|key| key.get(record).map(scalar_text).unwrap_or_default())
                .collect();
            writer.write_record(&row).map_err(|e| {
                EtlError::output_with(format!("Failed to write CSV record #{}", i + 1), e)
            })?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| EtlError::output_with("Failed to flush CSV output", e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| EtlError::output_with("CSV output is not UTF-8", e))
    }
}
