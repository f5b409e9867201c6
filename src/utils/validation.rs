use crate::domain::model::Format;
use crate::utils::error::{ConvertError, Result};

pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["csv", "json", "xlsx"];

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// The uploaded file must carry one of the accepted extensions and that
/// extension must match the declared source format. Matching is
/// case-insensitive, as output renaming is.
pub fn validate_source_file(file_name: &str, source: Format) -> Result<()> {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let accepted = ACCEPTED_EXTENSIONS.contains(&extension.as_str());
    if !accepted || extension != source.extension() {
        return Err(ConvertError::FileTypeMismatch { expected: source });
    }
    Ok(())
}

pub fn validate_format_token(field_name: &str, token: &str) -> Result<Format> {
    Format::from_token(token).ok_or_else(|| ConvertError::InvalidConfigValue {
        field: field_name.to_string(),
        value: token.to_string(),
        reason: "Supported formats: CSV, JSON, XLSX".to_string(),
    })
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ConvertError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ConvertError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConvertError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}
