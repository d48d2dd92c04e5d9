//! Types for the ingest pipeline.

use bytes::Bytes;
use serde::Serialize;

use crate::metadata::{MediaCategory, MediaDetails};
use crate::scanner::ScanResult;

/// An upload that passed validation, ready for the caller to store.
#[derive(Clone, Debug, Serialize)]
pub struct ProcessedUpload {
    pub safe_filename: String,
    pub original_filename: String,
    pub content_type: String,
    pub category: MediaCategory,
    /// Size of `data`, after any sanitization.
    pub size_bytes: usize,
    #[serde(skip)]
    pub data: Bytes,
    /// Unsafe only when the pipeline runs with `ScanAction::Flag`.
    pub scan: ScanResult,
    pub details: MediaDetails,
}
