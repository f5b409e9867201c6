use crate::domain::ports::{DeliverySink, FileStore};
use crate::utils::error::CodecResult;
use std::fs;
use std::path::Path;

/// Local-disk adapter for both ports: reads the input file as named and
/// delivers converted output into the configured directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    output_path: String,
}

impl LocalStorage {
    pub fn new(output_path: String) -> Self {
        Self { output_path }
    }
}

impl FileStore for LocalStorage {
    async fn read(&self, name: &str) -> CodecResult<Vec<u8>> {
        let data = fs::read(name)?;
        Ok(data)
    }
}

impl DeliverySink for LocalStorage {
    async fn deliver(&self, filename: &str, mime_type: &str, bytes: &[u8]) -> CodecResult<()> {
        let full_path = Path::new(&self.output_path).join(filename);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        tracing::debug!(
            "writing {} ({} bytes, {})",
            full_path.display(),
            bytes.len(),
            mime_type
        );
        fs::write(full_path, bytes)?;
        Ok(())
    }
}
