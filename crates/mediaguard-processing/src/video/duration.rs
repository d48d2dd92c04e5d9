//! Video duration extraction through a temp file and an external prober.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use mediaguard_core::ProcessingConfig;

use super::probe::FfprobeProber;
use super::temp_file::TempMediaFile;
use crate::error::ProcessingError;
use crate::traits::MediaProber;

/// Duration assumed for a video the prober could not read: its size at the
/// given byte rate, at least one second.
pub fn estimate_duration(size_bytes: usize, bytes_per_second: u64) -> f64 {
    let rate = bytes_per_second.max(1) as f64;
    (size_bytes as f64 / rate).max(1.0)
}

/// Reads a video's duration by handing its bytes to a [`MediaProber`].
///
/// Each call owns one uniquely named temp file, so any number of calls may
/// run concurrently against the same extractor.
#[derive(Clone)]
pub struct DurationExtractor {
    prober: Arc<dyn MediaProber>,
    temp_dir: PathBuf,
}

impl DurationExtractor {
    pub fn new(prober: Arc<dyn MediaProber>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            prober,
            temp_dir: temp_dir.into(),
        }
    }

    /// Extractor backed by ffprobe as configured.
    pub fn from_config(config: &ProcessingConfig) -> anyhow::Result<Self> {
        let prober = FfprobeProber::from_config(config)?;
        Ok(Self::new(Arc::new(prober), config.temp_dir.clone()))
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Duration in seconds, or the reason it could not be determined.
    ///
    /// The temp file is gone by the time this returns, whatever the outcome.
    pub async fn probe_duration(&self, data: &[u8]) -> Result<f64, ProcessingError> {
        let temp = TempMediaFile::create_in(&self.temp_dir)?;
        let result = self.probe_with(&temp, data).await;
        temp.release();
        result
    }

    async fn probe_with(&self, temp: &TempMediaFile, data: &[u8]) -> Result<f64, ProcessingError> {
        temp.write_all(data).await?;
        let report = self.prober.probe(temp.path()).await?;
        report.duration_seconds()
    }

    /// Best-effort duration: `None` when it could not be determined. Callers
    /// are expected to fall back to [`estimate_duration`].
    pub async fn extract_duration(&self, data: &[u8]) -> Option<f64> {
        match self.probe_duration(data).await {
            Ok(seconds) => {
                tracing::debug!(seconds, size_bytes = data.len(), "Extracted video duration");
                Some(seconds)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    size_bytes = data.len(),
                    "Could not determine video duration"
                );
                None
            }
        }
    }
}
