pub mod cli;

use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "tabcast"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Convert a tabular file between CSV, JSON and XLSX")
)]
pub struct CliConfig {
    /// Source format: CSV, JSON or XLSX
    #[cfg_attr(feature = "cli", arg(long))]
    pub from: String,

    /// Target format: CSV, JSON or XLSX
    #[cfg_attr(feature = "cli", arg(long))]
    pub to: String,

    /// File to convert
    pub input: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "./output"))]
    pub output_path: String,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,
}

impl CliConfig {
    /// The ordered-pair key as the UI form builds it: `"{from}_to_{to}"`.
    pub fn conversion_key(&self) -> String {
        format!(
            "{}_to_{}",
            self.from.trim().to_ascii_uppercase(),
            self.to.trim().to_ascii_uppercase()
        )
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("from", &self.from)?;
        validation::validate_non_empty_string("to", &self.to)?;
        validation::validate_path("input", &self.input)?;
        validation::validate_path("output_path", &self.output_path)?;

        // The pre-flight check the upload boundary performs: the selected
        // file's extension must match the declared source format. Unknown
        // to-formats are left for dispatch, which reports the pair itself.
        let source = validation::validate_format_token("from", &self.from)?;
        validation::validate_source_file(&self.input, source)?;
        Ok(())
    }
}
