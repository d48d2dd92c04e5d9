//! Video upload processor: probed duration with a size-based estimate as fallback.

use async_trait::async_trait;
use bytes::Bytes;

use crate::metadata::{MediaDetails, VideoDuration};
use crate::traits::UploadProcessor;
use crate::video::{estimate_duration, DurationExtractor};

/// Video upload processor.
pub struct VideoUploadProcessor {
    extractor: DurationExtractor,
    estimated_bytes_per_sec: u64,
}

impl VideoUploadProcessor {
    pub fn new(extractor: DurationExtractor, estimated_bytes_per_sec: u64) -> Self {
        Self {
            extractor,
            estimated_bytes_per_sec,
        }
    }
}

#[async_trait]
impl UploadProcessor for VideoUploadProcessor {
    async fn process(&self, data: Bytes) -> (Bytes, MediaDetails) {
        let duration = match self.extractor.extract_duration(&data).await {
            Some(seconds) => VideoDuration {
                seconds,
                estimated: false,
            },
            None => {
                let seconds = estimate_duration(data.len(), self.estimated_bytes_per_sec);
                tracing::info!(
                    seconds,
                    size_bytes = data.len(),
                    "Using estimated video duration"
                );
                VideoDuration {
                    seconds,
                    estimated: true,
                }
            }
        };

        (data, MediaDetails::Video(duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use crate::traits::{MediaProber, ProbeReport};
    use std::path::Path;
    use std::sync::Arc;

    struct FixedProber(Option<f64>);

    #[async_trait]
    impl MediaProber for FixedProber {
        async fn probe(&self, _path: &Path) -> Result<ProbeReport, ProcessingError> {
            match self.0 {
                Some(d) => Ok(serde_json::from_value(
                    serde_json::json!({ "format": { "duration": d.to_string() } }),
                )?),
                None => Err(ProcessingError::MissingDuration),
            }
        }
    }

    #[tokio::test]
    async fn test_probed_duration() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = DurationExtractor::new(Arc::new(FixedProber(Some(12.5))), dir.path());
        let processor = VideoUploadProcessor::new(extractor, 250_000);

        let data = Bytes::from_static(b"video");
        let (output, details) = processor.process(data.clone()).await;

        assert_eq!(output, data);
        assert_eq!(
            details,
            MediaDetails::Video(VideoDuration {
                seconds: 12.5,
                estimated: false
            })
        );
    }

    #[tokio::test]
    async fn test_estimated_duration_on_probe_failure() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = DurationExtractor::new(Arc::new(FixedProber(None)), dir.path());
        let processor = VideoUploadProcessor::new(extractor, 1_000);

        let (_, details) = processor.process(Bytes::from(vec![0u8; 5_000])).await;

        assert_eq!(
            details,
            MediaDetails::Video(VideoDuration {
                seconds: 5.0,
                estimated: true
            })
        );
    }
}
