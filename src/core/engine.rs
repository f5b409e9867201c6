use crate::core::codec;
use crate::domain::model::{ConversionReceipt, FormatPair};
use crate::domain::ports::{DeliverySink, FileStore};
use crate::utils::error::{ConvertError, Result};

/// The conversion dispatcher: selects the decode and encode halves from the
/// format pair and runs one read → decode → encode → deliver pass. Each call
/// is stateless and single-shot; failures never escape as panics and no
/// delivery happens on a failed conversion.
pub struct Converter<S: FileStore, D: DeliverySink> {
    store: S,
    sink: D,
}

impl<S: FileStore, D: DeliverySink> Converter<S, D> {
    pub fn new(store: S, sink: D) -> Self {
        Self { store, sink }
    }

    /// Boundary entry point: the caller-built `"CSV_to_JSON"`-style key plus
    /// the source filename.
    pub async fn convert_keyed(&self, key: &str, file_name: &str) -> Result<ConversionReceipt> {
        let pair = FormatPair::parse(key)?;
        self.convert(pair, file_name).await
    }

    pub async fn convert(&self, pair: FormatPair, file_name: &str) -> Result<ConversionReceipt> {
        let wrap = |err| ConvertError::codec(pair.source(), pair.target(), err);

        tracing::debug!("converting {} ({})", file_name, pair.key());
        let data = self.store.read(file_name).await.map_err(wrap)?;

        let records = codec::decode(pair.source(), &data).map_err(wrap)?;
        tracing::debug!("decoded {} records", records.len());

        let bytes = codec::encode(pair.target(), &records).map_err(wrap)?;
        let filename = pair.output_name(file_name);

        self.sink
            .deliver(&filename, pair.target().mime_type(), &bytes)
            .await
            .map_err(wrap)?;
        tracing::debug!("delivered {} ({} bytes)", filename, bytes.len());

        Ok(ConversionReceipt {
            filename,
            rows: records.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{CodecError, CodecResult};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        delivered: Arc<Mutex<HashMap<String, (String, Vec<u8>)>>>,
        fail_delivery: bool,
    }

    impl MockStorage {
        fn new() -> Self {
            Self::default()
        }

        async fn put(&self, name: &str, data: &[u8]) {
            self.files.lock().await.insert(name.to_string(), data.to_vec());
        }

        async fn delivered_file(&self, name: &str) -> Option<(String, Vec<u8>)> {
            self.delivered.lock().await.get(name).cloned()
        }

        async fn delivery_count(&self) -> usize {
            self.delivered.lock().await.len()
        }
    }

    impl FileStore for MockStorage {
        async fn read(&self, name: &str) -> CodecResult<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(name).cloned().ok_or_else(|| {
                CodecError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", name),
                ))
            })
        }
    }

    impl DeliverySink for MockStorage {
        async fn deliver(&self, filename: &str, mime_type: &str, bytes: &[u8]) -> CodecResult<()> {
            if self.fail_delivery {
                return Err(CodecError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "delivery refused",
                )));
            }
            self.delivered
                .lock()
                .await
                .insert(filename.to_string(), (mime_type.to_string(), bytes.to_vec()));
            Ok(())
        }
    }

    fn converter(storage: &MockStorage) -> Converter<MockStorage, MockStorage> {
        Converter::new(storage.clone(), storage.clone())
    }

    #[tokio::test]
    async fn test_convert_csv_to_json_delivers_renamed_output() {
        let storage = MockStorage::new();
        storage.put("report.csv", b"id,name\n1,Ada\n").await;

        let receipt = converter(&storage)
            .convert_keyed("CSV_to_JSON", "report.csv")
            .await
            .unwrap();

        assert_eq!(receipt.filename, "report.json");
        assert_eq!(receipt.rows, 1);

        let (mime, bytes) = storage.delivered_file("report.json").await.unwrap();
        assert_eq!(mime, "application/json;charset=utf-8;");
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, serde_json::json!([{"id": "1", "name": "Ada"}]));
    }

    #[tokio::test]
    async fn test_convert_unknown_key_humanizes_message() {
        let storage = MockStorage::new();
        let err = converter(&storage)
            .convert_keyed("CSV_to_CSV", "report.csv")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Error converting CSV to CSV");
        assert_eq!(storage.delivery_count().await, 0);
    }

    #[tokio::test]
    async fn test_convert_malformed_csv_yields_fixed_message() {
        let storage = MockStorage::new();
        storage.put("bad.csv", b"id,name\n1,\"Ada\n").await;

        let err = converter(&storage)
            .convert_keyed("CSV_to_JSON", "bad.csv")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Error parsing CSV file");
        assert_eq!(storage.delivery_count().await, 0);
    }

    #[tokio::test]
    async fn test_convert_json_object_yields_fixed_message() {
        let storage = MockStorage::new();
        storage.put("data.json", br#"{"id": 1}"#).await;

        for key in ["JSON_to_CSV", "JSON_to_XLSX"] {
            let err = converter(&storage)
                .convert_keyed(key, "data.json")
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "JSON file must contain an array of objects");
        }
        assert_eq!(storage.delivery_count().await, 0);
    }

    #[tokio::test]
    async fn test_convert_malformed_json_wraps_parser_message() {
        let storage = MockStorage::new();
        storage.put("data.json", b"{oops").await;

        let err = converter(&storage)
            .convert_keyed("JSON_to_CSV", "data.json")
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Error converting JSON to CSV: "), "{}", message);
    }

    #[tokio::test]
    async fn test_convert_missing_file_wraps_io_error() {
        let storage = MockStorage::new();
        let err = converter(&storage)
            .convert_keyed("CSV_to_XLSX", "absent.csv")
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Error converting CSV to XLSX: "), "{}", message);
        assert!(message.contains("absent.csv"));
    }

    #[tokio::test]
    async fn test_convert_delivery_failure_wraps_and_reports() {
        let mut storage = MockStorage::new();
        storage.fail_delivery = true;
        storage.put("report.csv", b"id\n1\n").await;

        let err = converter(&storage)
            .convert_keyed("CSV_to_JSON", "report.csv")
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Error converting CSV to JSON: "), "{}", message);
        assert!(message.contains("delivery refused"));
    }

    #[tokio::test]
    async fn test_convert_typed_pair_skips_key_parsing() {
        use crate::domain::model::Format;

        let storage = MockStorage::new();
        storage.put("rows.json", br#"[{"id": 1}]"#).await;

        let pair = FormatPair::new(Format::Json, Format::Csv).unwrap();
        let receipt = converter(&storage).convert(pair, "rows.json").await.unwrap();

        assert_eq!(receipt.filename, "rows.csv");
        let (mime, bytes) = storage.delivered_file("rows.csv").await.unwrap();
        assert_eq!(mime, "text/csv;charset=utf-8;");
        assert_eq!(String::from_utf8(bytes).unwrap(), "id\n1\n");
    }
}
