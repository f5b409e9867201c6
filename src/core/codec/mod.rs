//! Format codecs. Each format gets a decode half (source bytes into a
//! [`RecordSet`]) and an encode half ([`RecordSet`] into target bytes); the
//! dispatcher composes the two from the requested format pair instead of
//! hand-writing one function per ordered combination.

pub mod csv;
pub mod json;
pub mod xlsx;

use serde_json::Value;

use crate::domain::model::{Format, RecordSet};
use crate::utils::error::CodecResult;

pub fn decode(format: Format, data: &[u8]) -> CodecResult<RecordSet> {
    match format {
        Format::Csv => self::csv::decode(data),
        Format::Json => self::json::decode(data),
        Format::Xlsx => self::xlsx::decode(data),
    }
}

pub fn encode(format: Format, records: &RecordSet) -> CodecResult<Vec<u8>> {
    match format {
        Format::Csv => self::csv::encode(records),
        Format::Json => self::json::encode(records),
        Format::Xlsx => self::xlsx::encode(records),
    }
}

/// Flattens a cell value to the text form used by CSV fields and worksheet
/// strings. Nested arrays/objects become compact JSON; null becomes empty.
pub(crate) fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        nested => nested.to_string(),
    }
}
