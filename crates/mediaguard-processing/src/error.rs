//! Errors raised inside best-effort transforms.
//!
//! These never cross the public fallback boundary: `strip_exif` turns them into
//! the original buffer and `extract_duration` into `None`. They are exposed for
//! callers that use the fallible `try_*` / `probe_*` entry points directly.

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "image")]
    #[error("Image decode failed: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("Unsupported image format for EXIF stripping: {0}")]
    UnsupportedImageFormat(String),

    #[error("Failed to execute prober '{program}': {source}")]
    ProbeSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Prober exited with {status}: {stderr}")]
    ProbeFailed { status: String, stderr: String },

    #[error("Prober timed out after {0:?}")]
    ProbeTimeout(Duration),

    #[error("Failed to parse prober output: {0}")]
    ProbeOutput(#[from] serde_json::Error),

    #[error("Prober output has no format.duration")]
    MissingDuration,

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
}
