// Domain layer: core models and ports (interfaces). No dependencies on
// concrete storage or the CLI.

pub mod model;
pub mod ports;

pub use model::{ConversionReceipt, Format, FormatPair, Record, RecordSet};
pub use ports::{DeliverySink, FileStore};
