//! Media ingestion for untrusted uploads
//!
//! - Filename sanitization (filename)
//! - Magic-byte type verification (signature)
//! - Heuristic active-content scan (scanner)
//! - EXIF stripping with auto-orientation (image, feature `image`)
//! - Video duration probing via ffprobe (video)
//! - The end-to-end ingest pipeline (upload)

pub mod error;
pub mod filename;
#[cfg(feature = "image")]
pub mod image;
pub mod metadata;
pub mod scanner;
pub mod signature;
pub mod traits;
pub mod upload;
pub mod video;

pub use error::ProcessingError;
pub use filename::sanitize_filename;
#[cfg(feature = "image")]
pub use image::{strip_exif, ImageOrientation, ImageProcessor};
pub use metadata::{ImageMetadata, MediaCategory, MediaDetails, VideoDuration};
pub use scanner::{scan, ContentScanner, ScanResult};
pub use signature::{is_valid_type, SignatureValidator};
pub use traits::{MediaProber, ProbeReport, UploadProcessor, UploadScanner};
pub use upload::{IngestPipeline, ProcessedUpload};
pub use video::{estimate_duration, DurationExtractor, FfprobeProber, TempMediaFile};
