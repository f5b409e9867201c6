use serde_json::Value;

use crate::domain::model::{Record, RecordSet};
use crate::utils::error::{CodecError, CodecResult};

/// JSON decode. The document must be an array of objects; anything else
/// (object, scalar, array with non-object elements) is the fixed
/// not-an-array failure, while malformed JSON surfaces the parser's own
/// message. JSON value types are preserved in the record set.
pub fn decode(data: &[u8]) -> CodecResult<RecordSet> {
    let value: Value = serde_json::from_slice(data)?;
    let Value::Array(items) = value else {
        return Err(CodecError::JsonNotArray);
    };

    let mut set = RecordSet::new();
    for item in items {
        let Value::Object(data) = item else {
            return Err(CodecError::JsonNotArray);
        };
        set.push(Record { data });
    }
    Ok(set)
}

/// Serializes the records as an indented JSON array of objects, key order
/// preserved.
pub fn encode(records: &RecordSet) -> CodecResult<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(records.records())?)
}
