//! Scoped temp file handed to the external prober.

use std::io;
use std::path::Path;

use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

/// A uniquely named file owned by exactly one probe call.
///
/// Named `upload-{unix_millis}-{random}.tmp`. [`TempMediaFile::release`]
/// deletes it and logs a failed deletion; if the guard is dropped instead
/// (panic, cancelled future) the file is still removed.
#[derive(Debug)]
pub struct TempMediaFile {
    inner: NamedTempFile,
}

impl TempMediaFile {
    pub fn create_in(dir: &Path) -> io::Result<Self> {
        let prefix = format!("upload-{}-", chrono::Utc::now().timestamp_millis());
        let inner = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .rand_bytes(8)
            .tempfile_in(dir)?;
        Ok(Self { inner })
    }

    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Write `data` through the handle this guard owns. tokio's file buffers
    /// one chunk at a time, so the upload is never copied whole.
    pub async fn write_all(&self, data: &[u8]) -> io::Result<()> {
        let mut file = tokio::fs::File::from_std(self.inner.as_file().try_clone()?);
        file.write_all(data).await?;
        file.flush().await
    }

    /// Delete the file. Failure is logged, never returned.
    pub fn release(self) {
        let path = self.path().to_path_buf();
        if let Err(e) = self.inner.close() {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to delete temporary media file"
            );
        }
    }
}
