//! Streaming reader for PIT mutation reports.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::warn;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::mutation::MutationRecord;

/// Parses a report from XML text.
pub fn parse_str(xml: &str) -> Result<Vec<MutationRecord>> {
    let mut reader = Reader::from_str(xml);
    parse_reader(&mut reader)
}

/// Parses a report file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<MutationRecord>> {
    let file = File::open(path)?;
    let mut reader = Reader::from_reader(BufReader::new(file));
    parse_reader(&mut reader)
}

/// Fields of one `<mutation>` collected so far.
#[derive(Debug, Default)]
struct MutationBuilder {
    source_file: Option<String>,
    mutated_class: Option<String>,
    mutated_method: Option<String>,
    method_descriptor: Option<String>,
    line_number: Option<String>,
    mutator: Option<String>,
    indexes: Vec<usize>,
    blocks: Vec<usize>,
    description: Option<String>,
    status: Option<String>,
    detected: Option<bool>,
}

impl MutationBuilder {
    fn from_start(e: &BytesStart) -> Result<Self> {
        let mut builder = MutationBuilder::default();
        for attr in e.attributes() {
            let attr = attr.map_err(|e| Error::Parse(format!("Attribute error: {}", e)))?;
            let value = attr
                .unescape_value()
                .map_err(|e| Error::Parse(e.to_string()))?
                .to_string();
            match attr.key.as_ref() {
                b"status" => builder.status = Some(value),
                b"detected" => builder.detected = Some(value == "true"),
                _ => {}
            }
        }
        Ok(builder)
    }

    fn set(&mut self, element: &[u8], text: String) -> Result<()> {
        let text = text.trim().to_string();
        match element {
            b"sourceFile" => self.source_file = Some(text),
            b"mutatedClass" => self.mutated_class = Some(text),
            b"mutatedMethod" => self.mutated_method = Some(text),
            b"methodDescription" => self.method_descriptor = Some(text),
            b"lineNumber" => self.line_number = Some(text),
            b"mutator" => self.mutator = Some(text),
            b"description" => self.description = Some(text),
            b"index" => self.indexes.push(parse_number("index", &text)?),
            b"block" => self.blocks.push(parse_number("block", &text)?),
            _ => {}
        }
        Ok(())
    }

    /// Returns the record, or the name of the first missing field.
    fn build(self) -> std::result::Result<MutationRecord, &'static str> {
        let line_number = self
            .line_number
            .and_then(|l| l.parse().ok())
            .ok_or("lineNumber")?;
        Ok(MutationRecord {
            source_file: self.source_file.ok_or("sourceFile")?,
            mutated_class: self.mutated_class.ok_or("mutatedClass")?,
            mutated_method: self.mutated_method.ok_or("mutatedMethod")?,
            method_descriptor: self.method_descriptor.ok_or("methodDescription")?,
            line_number,
            operator_id: self.mutator.ok_or("mutator")?,
            instruction_indices: self.indexes,
            instruction_order: self.blocks,
            status: self.status,
            detected: self.detected,
            description: self.description,
        })
    }
}

fn parse_number(what: &str, text: &str) -> Result<usize> {
    text.parse()
        .map_err(|_| Error::Report(format!("invalid {} '{}'", what, text)))
}

fn parse_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<Vec<MutationRecord>> {
    let mut records = Vec::new();
    let mut seen_root = false;
    let mut current: Option<MutationBuilder> = None;
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                if !seen_root {
                    if e.name().as_ref() != b"mutations" {
                        return Err(Error::Report(format!(
                            "expected <mutations>, found <{}>",
                            String::from_utf8_lossy(e.name().as_ref())
                        )));
                    }
                    seen_root = true;
                } else if e.name().as_ref() == b"mutation" {
                    current = Some(MutationBuilder::from_start(e)?);
                }
                text.clear();
            }
            Event::Empty(ref e) => {
                if !seen_root && e.name().as_ref() == b"mutations" {
                    seen_root = true;
                }
            }
            Event::Text(e) => {
                let raw =
                    std::str::from_utf8(e.as_ref()).map_err(|e| Error::Parse(e.to_string()))?;
                text.push_str(raw);
            }
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(e.as_ref())),
            Event::GeneralRef(e) => text.push_str(&resolve_reference(&e)?),
            Event::End(ref e) => {
                let name = e.name();
                if name.as_ref() == b"mutation" {
                    if let Some(builder) = current.take() {
                        match builder.build() {
                            Ok(record) => records.push(record),
                            Err(field) => warn!("skipping mutation without {}", field),
                        }
                    }
                } else if let Some(builder) = current.as_mut() {
                    builder.set(name.as_ref(), std::mem::take(&mut text))?;
                }
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(Error::Report("no <mutations> element found".to_string()));
    }
    Ok(records)
}

fn resolve_reference(e: &BytesRef) -> Result<String> {
    let char_ref = e
        .resolve_char_ref()
        .map_err(|e| Error::Parse(e.to_string()))?;
    if let Some(c) = char_ref {
        return Ok(c.to_string());
    }
    let name = e.decode().map_err(|e| Error::Parse(e.to_string()))?;
    resolve_predefined_entity(&name)
        .map(str::to_string)
        .ok_or_else(|| Error::Parse(format!("unknown entity &{};", name)))
}
