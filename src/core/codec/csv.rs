use serde_json::Value;

use crate::domain::model::{Record, RecordSet};
use crate::utils::error::{CodecError, CodecResult};

/// Header-driven CSV decode. The first row names the columns; every
/// subsequent row becomes one record carrying all header keys, with empty
/// cells kept as empty strings. Any parse fault (malformed quoting,
/// inconsistent row width, invalid UTF-8) aborts the whole decode.
pub fn decode(data: &[u8]) -> CodecResult<RecordSet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()
        .map_err(CodecError::CsvParse)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(CodecError::CsvParse)?;
        let mut data = serde_json::Map::new();
        for (idx, name) in headers.iter().enumerate() {
            let cell = row.get(idx).unwrap_or("");
            data.insert(name.clone(), Value::String(cell.to_string()));
        }
        records.push(Record { data });
    }

    Ok(RecordSet::with_columns(headers, records))
}

/// Serializes the record set as CSV: header row from the column universe,
/// missing and null cells as empty fields.
pub fn encode(records: &RecordSet) -> CodecResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());

    // An empty column universe means an empty record set; the csv crate
    // rejects zero-field records, so write nothing at all.
    if !records.columns().is_empty() {
        writer.write_record(records.columns())?;
        for record in records.records() {
            let row: Vec<String> = records
                .columns()
                .iter()
                .map(|column| {
                    record
                        .data
                        .get(column)
                        .map(super::cell_text)
                        .unwrap_or_default()
                })
                .collect();
            writer.write_record(&row)?;
        }
    }

    writer.flush()?;
    writer
        .into_inner()
        .map_err(|err| CodecError::Io(std::io::Error::other(err)))
}
