use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::error::{ConvertError, Result};

/// One of the three supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    Csv,
    Json,
    Xlsx,
}

impl Format {
    /// Canonical lowercase file extension, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Json => "json",
            Format::Xlsx => "xlsx",
        }
    }

    /// MIME type used when delivering converted output.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Format::Csv => "text/csv;charset=utf-8;",
            Format::Json => "application/json;charset=utf-8;",
            Format::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    /// Parses a format selector token ("CSV", "JSON", "XLSX"), case-insensitive.
    pub fn from_token(token: &str) -> Option<Format> {
        match token.trim().to_ascii_uppercase().as_str() {
            "CSV" => Some(Format::Csv),
            "JSON" => Some(Format::Json),
            "XLSX" => Some(Format::Xlsx),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Format::Csv => "CSV",
            Format::Json => "JSON",
            Format::Xlsx => "XLSX",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A validated ordered (source, target) format pair. Same-format pairs are
/// rejected at construction, so every `FormatPair` names a real conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatPair {
    source: Format,
    target: Format,
}

impl FormatPair {
    pub fn new(source: Format, target: Format) -> Result<Self> {
        if source == target {
            return Err(ConvertError::UnsupportedConversion {
                key: format!("{} to {}", source, target),
            });
        }
        Ok(Self { source, target })
    }

    /// Parses a boundary key of the form `"CSV_to_JSON"`. Any malformed,
    /// unknown or same-format key fails with the key humanized (underscores
    /// replaced by spaces) in the error message.
    pub fn parse(key: &str) -> Result<Self> {
        let unsupported = || ConvertError::UnsupportedConversion {
            key: key.replace('_', " "),
        };
        let (src, dst) = key.split_once("_to_").ok_or_else(unsupported)?;
        let source = Format::from_token(src).ok_or_else(unsupported)?;
        let target = Format::from_token(dst).ok_or_else(unsupported)?;
        if source == target {
            return Err(unsupported());
        }
        Ok(Self { source, target })
    }

    pub fn source(&self) -> Format {
        self.source
    }

    pub fn target(&self) -> Format {
        self.target
    }

    pub fn key(&self) -> String {
        format!("{}_to_{}", self.source, self.target)
    }

    /// Derives the output filename: the source extension (matched
    /// case-insensitively at the end of the name) is replaced by the target
    /// extension. A name without the expected extension passes through
    /// unchanged; the mismatch is caught earlier at the caller boundary.
    pub fn output_name(&self, input: &str) -> String {
        let suffix = format!(".{}", self.source.extension());
        match input
            .len()
            .checked_sub(suffix.len())
            .filter(|split| input.is_char_boundary(*split))
        {
            Some(split) if input[split..].eq_ignore_ascii_case(&suffix) => {
                format!("{}.{}", &input[..split], self.target.extension())
            }
            _ => input.to_string(),
        }
    }
}

/// A single row: column name to cell value, in column order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: Map<String, Value>,
}

/// The intermediate representation every conversion pivots through: an
/// ordered sequence of records plus the column universe (the union of keys
/// seen across records, in first-seen order). A key missing from a record is
/// treated as an empty cell, not an error.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set whose column order starts from a header row (CSV/XLSX
    /// decode); keys not covered by the header are appended as encountered.
    pub fn with_columns(columns: Vec<String>, records: Vec<Record>) -> Self {
        let mut set = Self {
            columns,
            records: Vec::with_capacity(records.len()),
        };
        for record in records {
            set.push(record);
        }
        set
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        Self::with_columns(Vec::new(), records)
    }

    pub fn push(&mut self, record: Record) {
        for key in record.data.keys() {
            if !self.columns.iter().any(|column| column == key) {
                self.columns.push(key.clone());
            }
        }
        self.records.push(record);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Returned on success: the delivered filename and how many records were
/// converted.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReceipt {
    pub filename: String,
    pub rows: usize,
}
