//! XML reading and writing
//!
//! The reader turns every direct child of the document root that carries
//! the item tag into one keyed record:
//!
//! ```xml
//! <catalog>
//!   <item id="7"><name>Lamp</name><tag>a</tag><tag>b</tag></item>
//! </catalog>
//! ```
//!
//! becomes `{"id": "7", "name": "Lamp", "tag": ["a", "b"]}`. Attributes and
//! child elements both become fields, leaf elements become strings, and
//! deeper elements become nested objects. Text that sits beside child
//! elements or attributes is kept under [`TEXT_KEY`].
//!
//! The formatter goes the other way: one item element per record under a
//! named root, objects recurse into child elements, and an array field
//! repeats its element once per entry.

use super::{FormatReader, read_text};
use crate::error::{EtlError, Result};
use crate::etl::{OutputFormatter, RecordSink, Transformer};
use crate::record::{Record, RecordSequence, scalar_text};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesDecl, BytesEnd, BytesRef, BytesStart, BytesText, Event};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::{Read, Write};

/// Field holding element text that has attributes or children next to it
pub const TEXT_KEY: &str = "#text";

const MULTIPLE_ROOTS: &str = "XML document has more than one root element";

/// Element used for keys that are not valid XML names
const FALLBACK_ELEMENT: &str = "field";

/// Element names shared by [`XmlReader`] and [`XmlFormatter`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmlOptions {
    /// Document root element written by the formatter
    pub root: String,
    /// Element that holds one record
    pub item: String,
    /// Write an `<?xml ...?>` declaration
    pub declaration: bool,
    /// Indent nested elements by this many spaces
    pub indent: Option<usize>,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            root: "root".to_string(),
            item: "item".to_string(),
            declaration: true,
            indent: None,
        }
    }
}

/// Decode XML item elements into keyed records
#[derive(Debug, Clone)]
pub struct XmlReader {
    item: String,
}

impl Default for XmlReader {
    fn default() -> Self {
        Self::from_options(&XmlOptions::default())
    }
}

impl XmlReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(options: &XmlOptions) -> Self {
        Self {
            item: options.item.clone(),
        }
    }

    /// Match a different item tag
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item = item.into();
        self
    }

    fn is_item(&self, start: &BytesStart<'_>) -> bool {
        start.name().as_ref() == self.item.as_bytes()
    }
}

impl FormatReader for XmlReader {
    fn read(
        &self,
        input: &mut dyn Read,
        transformer: &mut dyn Transformer,
    ) -> Result<RecordSequence> {
        let text = read_text(input, "XML")?;
        let mut reader = Reader::from_str(&text);
        let mut sink = RecordSink::new(transformer);
        let mut root_open = false;
        let mut root_seen = false;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| malformed(reader.buffer_position(), e))?;

            match event {
                Event::Start(_) if !root_open => {
                    if root_seen {
                        return Err(EtlError::resource(MULTIPLE_ROOTS));
                    }
                    root_seen = true;
                    root_open = true;
                }
                Event::Start(start) => {
                    if self.is_item(&start) {
                        let element = parse_element(&mut reader, &start)?;
                        sink.push(into_record(element));
                    } else {
                        reader
                            .read_to_end(start.name())
                            .map_err(|e| malformed(reader.buffer_position(), e))?;
                    }
                }
                Event::Empty(_) if !root_open => {
                    if root_seen {
                        return Err(EtlError::resource(MULTIPLE_ROOTS));
                    }
                    root_seen = true;
                }
                Event::Empty(start) => {
                    if self.is_item(&start) {
                        sink.push(into_record(empty_element(&start)?));
                    }
                }
                Event::End(_) => root_open = false,
                Event::Eof => break,
                _ => {}
            }
        }

        if !root_seen {
            return Err(EtlError::resource("XML document has no root element"));
        }
        if root_open {
            return Err(EtlError::resource(
                "XML document ended before the root element was closed",
            ));
        }

        log::debug!("Decoded {} <{}> elements", sink.seen(), self.item);
        Ok(sink.finish())
    }
}

fn malformed(position: impl std::fmt::Display, e: quick_xml::Error) -> EtlError {
    EtlError::resource_with(format!("Failed to parse XML at byte {}", position), e)
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

/// Consume everything up to the matching end tag and build its value
fn parse_element(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<Value> {
    let mut fields = attributes(start)?;
    let mut text = String::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| malformed(reader.buffer_position(), e))?;

        match event {
            Event::Start(child) => {
                let value = parse_element(reader, &child)?;
                insert_child(&mut fields, element_name(&child), value);
            }
            Event::Empty(child) => {
                let value = empty_element(&child)?;
                insert_child(&mut fields, element_name(&child), value);
            }
            Event::Text(t) => text.push_str(&String::from_utf8_lossy(&t)),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
            Event::GeneralRef(r) => text.push_str(&resolve_reference(&r)?),
            Event::End(_) => break,
            Event::Eof => {
                return Err(EtlError::resource(format!(
                    "XML document ended inside <{}>",
                    element_name(start)
                )));
            }
            _ => {}
        }
    }

    Ok(finish_element(fields, text))
}

fn empty_element(start: &BytesStart<'_>) -> Result<Value> {
    Ok(finish_element(attributes(start)?, String::new()))
}

fn attributes(start: &BytesStart<'_>) -> Result<Map<String, Value>> {
    let mut fields = Map::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| {
            EtlError::resource_with(
                format!("Invalid attribute on <{}>", element_name(start)),
                e,
            )
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape(&raw).map_err(|e| {
            EtlError::resource_with(format!("Invalid value for attribute {}", key), e)
        })?;
        fields.insert(key, Value::String(value.into_owned()));
    }
    Ok(fields)
}

fn resolve_reference(reference: &BytesRef<'_>) -> Result<String> {
    let character = reference
        .resolve_char_ref()
        .map_err(|e| EtlError::resource_with("Invalid character reference in XML", e))?;
    if let Some(c) = character {
        return Ok(c.to_string());
    }

    let name = String::from_utf8_lossy(reference);
    resolve_predefined_entity(&name)
        .map(str::to_string)
        .ok_or_else(|| EtlError::resource(format!("Unknown XML entity &{};", name)))
}

fn insert_child(fields: &mut Map<String, Value>, name: String, value: Value) {
    match fields.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            fields.insert(name, value);
        }
    }
}

/// Leaf text is kept as written; whitespace-only text beside fields is layout
fn finish_element(mut fields: Map<String, Value>, text: String) -> Value {
    if fields.is_empty() {
        return Value::String(text);
    }
    if !text.trim().is_empty() {
        fields.insert(TEXT_KEY.to_string(), Value::String(text));
    }
    Value::Object(fields)
}

/// Records are always keyed, even when the item element holds only text
fn into_record(element: Value) -> Record {
    match element {
        Value::String(text) if text.trim().is_empty() => Value::Object(Map::new()),
        Value::String(text) => {
            let mut fields = Map::new();
            fields.insert(TEXT_KEY.to_string(), Value::String(text));
            Value::Object(fields)
        }
        other => other,
    }
}

/// Serialize records as an XML document
///
/// An empty sequence produces an empty root element.
#[derive(Debug, Clone, Default)]
pub struct XmlFormatter {
    options: XmlOptions,
}

impl XmlFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(options: XmlOptions) -> Self {
        Self { options }
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.options.root = root.into();
        self
    }

    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.options.item = item.into();
        self
    }

    pub fn with_declaration(mut self, declaration: bool) -> Self {
        self.options.declaration = declaration;
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.options.indent = Some(indent);
        self
    }

    fn check_names(&self) -> Result<()> {
        for (what, name) in [("root", &self.options.root), ("item", &self.options.item)] {
            if !is_xml_name(name) {
                return Err(EtlError::configuration(format!(
                    "XML {} element name {:?} is not a valid XML name",
                    what, name
                )));
            }
        }
        Ok(())
    }
}

impl OutputFormatter for XmlFormatter {
    fn serialize(&self, records: &[Record]) -> Result<String> {
        self.check_names()?;

        let mut writer = match self.options.indent {
            Some(indent) => Writer::new_with_indent(Vec::new(), b' ', indent),
            None => Writer::new(Vec::new()),
        };

        if self.options.declaration {
            writer
                .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
                .map_err(write_failed)?;
            if self.options.indent.is_none() {
                writer.get_mut().write_all(b"\n").map_err(write_failed)?;
            }
        }

        let root = self.options.root.as_str();
        writer
            .write_event(Event::Start(BytesStart::new(root)))
            .map_err(write_failed)?;
        for record in records {
            write_element(&mut writer, &self.options.item, record)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(root)))
            .map_err(write_failed)?;

        String::from_utf8(writer.into_inner())
            .map_err(|e| EtlError::output_with("XML output is not UTF-8", e))
    }
}

fn write_failed(e: impl Into<crate::error::BoxError>) -> EtlError {
    EtlError::output_with("Failed to write XML", e)
}

/// Write `value` as one element called `name`
fn write_element(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> Result<()> {
    let (start, end) = if is_xml_name(name) {
        (BytesStart::new(name), BytesEnd::new(name))
    } else {
        (
            BytesStart::new(FALLBACK_ELEMENT).with_attributes([("key", name)]),
            BytesEnd::new(FALLBACK_ELEMENT),
        )
    };

    match value {
        Value::Null => {
            writer.write_event(Event::Empty(start)).map_err(write_failed)?;
            return Ok(());
        }
        Value::Object(map) => {
            writer.write_event(Event::Start(start)).map_err(write_failed)?;
            for (key, child) in map {
                if key == TEXT_KEY && !child.is_object() && !child.is_array() {
                    let text = scalar_text(child);
                    writer
                        .write_event(Event::Text(BytesText::new(&text)))
                        .map_err(write_failed)?;
                } else {
                    write_field(writer, key, child)?;
                }
            }
        }
        Value::Array(items) => {
            writer.write_event(Event::Start(start)).map_err(write_failed)?;
            for (index, child) in items.iter().enumerate() {
                write_field(writer, &index.to_string(), child)?;
            }
        }
        scalar => {
            writer.write_event(Event::Start(start)).map_err(write_failed)?;
            let text = scalar_text(scalar);
            writer
                .write_event(Event::Text(BytesText::new(&text)))
                .map_err(write_failed)?;
        }
    }

    writer.write_event(Event::End(end)).map_err(write_failed)?;
    Ok(())
}

/// Write a field; array values repeat the field element per entry
fn write_field(writer: &mut Writer<Vec<u8>>, key: &str, value: &Value) -> Result<()> {
    match value {
        Value::Array(items) => items
            .iter()
            .try_for_each(|item| write_element(writer, key, item)),
        other => write_element(writer, key, other),
    }
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
