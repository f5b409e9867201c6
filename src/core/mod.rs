pub mod codec;
pub mod engine;

pub use crate::domain::model::{ConversionReceipt, Format, FormatPair, Record, RecordSet};
pub use crate::domain::ports::{DeliverySink, FileStore};
pub use crate::utils::error::Result;
