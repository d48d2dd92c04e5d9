//! Image upload processor: metadata + EXIF sanitization.

use async_trait::async_trait;
use bytes::Bytes;

use crate::image::ImageProcessor;
use crate::metadata::MediaDetails;
use crate::traits::UploadProcessor;

/// Image upload processor.
pub struct ImageUploadProcessor {
    remove_exif: bool,
}

impl ImageUploadProcessor {
    pub fn new(remove_exif: bool) -> Self {
        Self { remove_exif }
    }
}

#[async_trait]
impl UploadProcessor for ImageUploadProcessor {
    async fn process(&self, data: Bytes) -> (Bytes, MediaDetails) {
        let remove_exif = self.remove_exif;
        let input = data.clone();

        // Decode and re-encode are CPU-bound; run off the async pool.
        let joined = tokio::task::spawn_blocking(move || {
            let metadata = match ImageProcessor::read_metadata(&input) {
                Ok(metadata) => Some(metadata),
                Err(e) => {
                    tracing::debug!(error = %e, "Could not read image metadata");
                    None
                }
            };
            let output = if remove_exif {
                ImageProcessor::strip_exif(&input)
            } else {
                input.clone()
            };
            let stripped = remove_exif && output != input;
            (output, metadata, stripped)
        })
        .await;

        match joined {
            Ok((output, metadata, exif_stripped)) => (
                output,
                MediaDetails::Image {
                    metadata,
                    exif_stripped,
                },
            ),
            Err(e) => {
                tracing::warn!(error = %e, "Image processing task failed, keeping original");
                (
                    data,
                    MediaDetails::Image {
                        metadata: None,
                        exif_stripped: false,
                    },
                )
            }
        }
    }
}
