//! Media metadata types produced at ingest

use serde::{Deserialize, Serialize};

use crate::signature::mime_essence;

/// Broad media category, derived from the declared MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Image,
    Video,
    Other,
}

impl MediaCategory {
    pub fn from_mime(declared_mime: &str) -> Self {
        let mime = mime_essence(declared_mime);
        if mime.starts_with("image/") {
            MediaCategory::Image
        } else if mime.starts_with("video/") {
            MediaCategory::Video
        } else {
            MediaCategory::Other
        }
    }
}

/// Image metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub size_bytes: u64,
    /// Orientation tag of the upload (1-8), `None` when absent or normal.
    pub exif_orientation: Option<u8>,
}

/// Video duration, probed or estimated from the file size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoDuration {
    pub seconds: f64,
    pub estimated: bool,
}

/// Per-category details attached to a processed upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaDetails {
    /// `metadata` is `None` when the image could not be decoded.
    Image {
        metadata: Option<ImageMetadata>,
        exif_stripped: bool,
    },
    Video(VideoDuration),
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_mime() {
        assert_eq!(MediaCategory::from_mime("image/jpeg"), MediaCategory::Image);
        assert_eq!(MediaCategory::from_mime("Video/MP4"), MediaCategory::Video);
        assert_eq!(
            MediaCategory::from_mime("video/webm; codecs=vp9"),
            MediaCategory::Video
        );
        assert_eq!(
            MediaCategory::from_mime("application/pdf"),
            MediaCategory::Other
        );
        assert_eq!(MediaCategory::from_mime(""), MediaCategory::Other);
    }

    #[test]
    fn test_media_details_serialization() {
        let details = MediaDetails::Video(VideoDuration {
            seconds: 12.5,
            estimated: true,
        });
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["kind"], "video");
        assert_eq!(json["seconds"], 12.5);
        assert_eq!(json["estimated"], true);

        let details = MediaDetails::Image {
            metadata: None,
            exif_stripped: false,
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["kind"], "image");
        assert!(json["metadata"].is_null());
    }
}
