//! Format readers and output formatters
//!
//! This module handles every on-disk format the pipeline understands:
//! - CSV reading and writing
//! - JSON reading and writing
//! - XML reading and writing
//!
//! Each format lives in its own file holding both directions.

mod csv;
mod json;
mod xml;

pub use self::csv::{CsvFormatter, CsvOptions, CsvReader};
pub use self::json::{JsonFormatter, JsonOptions, JsonReader};
pub use self::xml::{XmlFormatter, XmlOptions, XmlReader};

use crate::error::{EtlError, Result};
use crate::etl::Transformer;
use crate::record::RecordSequence;
use std::io::Read;

/// FormatReader trait for decoding one raw stream into records
///
/// Every decoded record is threaded through the transformer with the same
/// first-record split a [`Resource`](crate::etl::Resource) applies. A
/// decode failure fails the whole call; no partial sequence is returned.
pub trait FormatReader {
    /// Decode `input` and transform each record
    ///
    /// # Errors
    /// Returns a resource error if the stream cannot be read or is not
    /// valid for the format.
    fn read(
        &self,
        input: &mut dyn Read,
        transformer: &mut dyn Transformer,
    ) -> Result<RecordSequence>;

    /// Decode an in-memory string
    fn read_str(&self, input: &str, transformer: &mut dyn Transformer) -> Result<RecordSequence> {
        self.read(&mut input.as_bytes(), transformer)
    }
}

impl<F: FormatReader + ?Sized> FormatReader for Box<F> {
    fn read(
        &self,
        input: &mut dyn Read,
        transformer: &mut dyn Transformer,
    ) -> Result<RecordSequence> {
        (**self).read(input, transformer)
    }
}

/// Read a whole stream as UTF-8 text
fn read_text(input: &mut dyn Read, format: &str) -> Result<String> {
    let mut text = String::new();
    input
        .read_to_string(&mut text)
        .map_err(|e| EtlError::resource_with(format!("Failed to read {} input", format), e))?;
    Ok(text)
}

/// Convert a single-character option into the byte the codecs expect
fn ascii_byte(c: char, option: &str) -> Result<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(EtlError::configuration(format!(
            "{} must be an ASCII character, got {:?}",
            option, c
        )))
    }
}
