pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::cli::LocalStorage;
pub use config::CliConfig;

pub use core::engine::Converter;
pub use domain::model::{ConversionReceipt, Format, FormatPair, Record, RecordSet};
pub use domain::ports::{DeliverySink, FileStore};
pub use utils::error::{ConvertError, Result};
