use thiserror::Error;

use crate::domain::model::Format;

/// Low-level fault raised inside a codec (decode, encode or delivery),
/// before conversion context is attached.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    CsvParse(#[source] csv::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON document is not an array of objects")]
    JsonNotArray,

    #[error("Zip operation failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("workbook error: {message}")]
    Workbook { message: String },
}

pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Terminal conversion outcome. Every failure path of a conversion attempt
/// resolves to exactly one of these; nothing escapes as a panic.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Error parsing CSV file")]
    CsvParse(#[source] csv::Error),

    #[error("JSON file must contain an array of objects")]
    JsonNotArray,

    #[error("Error converting {key}")]
    UnsupportedConversion { key: String },

    #[error("Error converting {from} to {to}: {source}")]
    Conversion {
        from: Format,
        to: Format,
        #[source]
        source: CodecError,
    },

    #[error("Invalid file type. Expected {expected} file.")]
    FileTypeMismatch { expected: Format },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

impl ConvertError {
    /// Attaches conversion context to a codec fault. The two fixed-message
    /// decode failures pass through unchanged; everything else is wrapped
    /// with the "Error converting X to Y" prefix.
    pub fn codec(from: Format, to: Format, source: CodecError) -> Self {
        match source {
            CodecError::CsvParse(err) => ConvertError::CsvParse(err),
            CodecError::JsonNotArray => ConvertError::JsonNotArray,
            source => ConvertError::Conversion { from, to, source },
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
