//! CSV rendering of result items.
//!
//! Two record shapes are supported, decided by the first record:
//!
//! - maps: the header is the first record's keys in order, one row per
//!   record follows; keys missing from a later record yield empty cells and
//!   extra keys are dropped
//! - lists: positional rows, no header
//!
//! Cells that are not strings are written as their JSON encoding. Anything
//! else (no records, a scalar first record, mixed shapes) is rejected with
//! [`EvidenceError::SerializationUnsupported`].

use csv::{Terminator, WriterBuilder};
use serde_json::Value;

use crate::error::{EvidenceError, EvidenceResult};

/// Renders records as CSV text.
pub fn to_csv(records: &[Value]) -> EvidenceResult<String> {
    let first = records
        .first()
        .ok_or_else(|| unsupported("result has no records"))?;

    let mut writer = WriterBuilder::new()
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    match first {
        Value::Object(head) => {
            let columns: Vec<&str> = head.keys().map(String::as_str).collect();
            writer.write_record(&columns)?;
            for (row, record) in records.iter().enumerate() {
                let Value::Object(map) = record else {
                    return Err(mixed_shape(row));
                };
                writer.write_record(
                    columns
                        .iter()
                        .map(|column| map.get(*column).map(cell).unwrap_or_default()),
                )?;
            }
        }
        Value::Array(_) => {
            for (row, record) in records.iter().enumerate() {
                let Value::Array(cells) = record else {
                    return Err(mixed_shape(row));
                };
                writer.write_record(cells.iter().map(cell))?;
            }
        }
        _ => return Err(unsupported("records must be maps or lists")),
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| unsupported(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| unsupported(e.to_string()))
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn mixed_shape(row: usize) -> EvidenceError {
    unsupported(format!("record {} does not match the shape of the first record", row))
}

fn unsupported(reason: impl Into<String>) -> EvidenceError {
    EvidenceError::unsupported_format("csv", reason)
}
