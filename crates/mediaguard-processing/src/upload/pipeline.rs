//! Ingest pipeline. Each upload goes through these steps in order:
//!
//! - sanitize the filename
//! - check emptiness, the type allowlist and the size limit
//! - verify the magic bytes against the declared type
//! - scan for embedded active content
//! - strip EXIF from images or read the duration of videos
//!
//! The rejecting checks run before any media work and surface as [`AppError`].
//! The media step is best-effort: a failed EXIF strip keeps the original
//! bytes and a failed probe falls back to an estimated duration.

use std::sync::Arc;

use bytes::Bytes;

use mediaguard_core::{AppError, ProcessingConfig, ScanAction};

use super::types::ProcessedUpload;
use crate::filename::sanitize_filename;
use crate::metadata::{MediaCategory, MediaDetails};
use crate::scanner::ContentScanner;
use crate::signature::{mime_essence, SignatureValidator};
use crate::traits::{UploadProcessor, UploadScanner};
use crate::video::DurationExtractor;

#[cfg(feature = "image")]
use super::image_processor::ImageUploadProcessor;
use super::video_processor::VideoUploadProcessor;

/// Image step when EXIF support is compiled out: bytes pass through untouched.
#[cfg(not(feature = "image"))]
struct PassthroughImageProcessor;

#[cfg(not(feature = "image"))]
#[async_trait::async_trait]
impl UploadProcessor for PassthroughImageProcessor {
    async fn process(&self, data: Bytes) -> (Bytes, MediaDetails) {
        (
            data,
            MediaDetails::Image {
                metadata: None,
                exif_stripped: false,
            },
        )
    }
}

pub struct IngestPipeline {
    config: ProcessingConfig,
    signatures: SignatureValidator,
    scanner: Arc<dyn UploadScanner>,
    image: Arc<dyn UploadProcessor>,
    video: Arc<dyn UploadProcessor>,
}

impl IngestPipeline {
    /// Pipeline using `extractor` for video durations and the built-in content scanner.
    pub fn new(config: ProcessingConfig, extractor: DurationExtractor) -> Self {
        #[cfg(feature = "image")]
        let image: Arc<dyn UploadProcessor> =
            Arc::new(ImageUploadProcessor::new(config.remove_exif));
        #[cfg(not(feature = "image"))]
        let image: Arc<dyn UploadProcessor> = Arc::new(PassthroughImageProcessor);

        let video = Arc::new(VideoUploadProcessor::new(
            extractor,
            config.estimated_video_bytes_per_sec,
        ));

        Self {
            signatures: SignatureValidator::new(config.signature_policy),
            scanner: Arc::new(ContentScanner::new()),
            image,
            video,
            config,
        }
    }

    /// Pipeline probing with ffprobe as configured.
    pub fn from_config(config: ProcessingConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let extractor = DurationExtractor::from_config(&config)?;
        Ok(Self::new(config, extractor))
    }

    /// Replace the content scanner.
    pub fn with_scanner(mut self, scanner: Arc<dyn UploadScanner>) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    fn size_limit(&self, category: MediaCategory) -> usize {
        match category {
            MediaCategory::Video => self.config.max_video_size_bytes,
            MediaCategory::Image | MediaCategory::Other => self.config.max_image_size_bytes,
        }
    }

    /// Run the checks that may reject an upload. Nothing is transformed yet.
    fn check(&self, content_type: &str, data: &[u8]) -> Result<MediaCategory, AppError> {
        if data.is_empty() {
            return Err(AppError::EmptyFile);
        }

        if !self.config.is_content_type_allowed(content_type) {
            return Err(AppError::UnsupportedMediaType(content_type.to_string()));
        }

        let category = MediaCategory::from_mime(content_type);
        let max = self.size_limit(category);
        if data.len() > max {
            return Err(AppError::PayloadTooLarge {
                size: data.len(),
                max,
            });
        }

        if !self.signatures.is_valid(data, content_type) {
            return Err(AppError::InvalidInput(format!(
                "File content does not match declared type {}",
                content_type
            )));
        }

        Ok(category)
    }

    #[tracing::instrument(skip(self, data), fields(size_bytes = data.len()))]
    pub async fn ingest(
        &self,
        original_filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<ProcessedUpload, AppError> {
        let safe_filename = sanitize_filename(original_filename);
        let content_type = mime_essence(content_type);

        let category = self.check(&content_type, &data).map_err(|e| {
            tracing::debug!(error = %e, "Upload rejected");
            e
        })?;

        let scan = self.scanner.scan(&data).await;
        if !scan.is_safe {
            match self.config.scan_action {
                ScanAction::Reject => {
                    let pattern = match scan.matched_pattern {
                        Some(pattern) => pattern.to_string(),
                        None => scan.reason,
                    };
                    return Err(AppError::SuspiciousContent(pattern));
                }
                ScanAction::Flag => {
                    tracing::warn!(safe_filename = %safe_filename, "Accepting flagged upload");
                }
            }
        }

        let (data, details) = match category {
            MediaCategory::Image => self.image.process(data).await,
            MediaCategory::Video => self.video.process(data).await,
            MediaCategory::Other => (data, MediaDetails::Other),
        };

        tracing::info!(
            safe_filename = %safe_filename,
            category = ?category,
            output_bytes = data.len(),
            "Upload processed"
        );

        Ok(ProcessedUpload {
            safe_filename,
            original_filename: original_filename.to_string(),
            content_type,
            category,
            size_bytes: data.len(),
            data,
            scan,
            details,
        })
    }
}
