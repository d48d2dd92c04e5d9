//! Upload ingestion
//!
//! [`IngestPipeline`] runs every check on an incoming upload and hands back
//! a [`ProcessedUpload`] with sanitized bytes and a safe filename.

#[cfg(feature = "image")]
pub mod image_processor;
pub mod pipeline;
pub mod types;
pub mod video_processor;

#[cfg(feature = "image")]
pub use image_processor::ImageUploadProcessor;
pub use pipeline::IngestPipeline;
pub use types::ProcessedUpload;
pub use video_processor::VideoUploadProcessor;
