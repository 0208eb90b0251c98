//! Payload validation and JSON Lines encoding.
//!
//! A write call accepts either one record (JSON object) or an ordered
//! sequence of records, possibly nested. The whole payload is validated
//! before anything is encoded, so a rejected call persists nothing.

use crate::error::{PersistenceError, PersistenceResult};
use mbtc_core::Record;
use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::Value;
use std::io;

/// Records of one write call, flattened in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload<'a> {
    records: Vec<&'a Record>,
}

impl<'a> Payload<'a> {
    /// Flatten `data` into records.
    ///
    /// # Errors
    /// `UnsupportedDataType` if `data`, or any element of a sequence, is
    /// neither an object nor a sequence.
    pub fn from_value(data: &'a Value) -> PersistenceResult<Self> {
        let mut records = Vec::new();
        collect(data, &mut records)?;
        Ok(Self { records })
    }

    pub fn records(&self) -> &[&'a Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One line per record, each terminated by `\n`.
    pub fn to_json_lines(&self) -> PersistenceResult<Vec<u8>> {
        let mut buf = Vec::new();
        for record in &self.records {
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, LineFormatter);
            record.serialize(&mut ser)?;
            buf.push(b'\n');
        }
        Ok(buf)
    }
}

fn collect<'a>(data: &'a Value, out: &mut Vec<&'a Record>) -> PersistenceResult<()> {
    match data {
        Value::Object(record) => {
            out.push(record);
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(|item| collect(item, out)),
        other => Err(PersistenceError::UnsupportedDataType {
            shape: shape_of(other),
        }),
    }
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Single-line output with `", "` and `": "` separators: `{"a": 1, "b": [1, 2]}`.
#[derive(Debug, Clone, Copy, Default)]
struct LineFormatter;

impl Formatter for LineFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}
