//! Seams of the ingest pipeline
//!
//! External engines sit behind these traits so deployments can swap them
//! (another scanner, a remote prober) and tests can inject fakes.

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;

use crate::error::ProcessingError;
use crate::metadata::MediaDetails;
use crate::scanner::ScanResult;

/// Content scanner consulted by the ingest pipeline before any media work.
#[async_trait]
pub trait UploadScanner: Send + Sync {
    async fn scan(&self, data: &[u8]) -> ScanResult;
}

/// Media-specific ingest step (EXIF stripping, duration probing).
///
/// Infallible by contract: a failed transform degrades to the input bytes
/// and whatever details could still be derived.
#[async_trait]
pub trait UploadProcessor: Send + Sync {
    async fn process(&self, data: Bytes) -> (Bytes, MediaDetails);
}

/// Container-level metadata reported by a media prober.
///
/// Only `format.duration` is consumed. ffprobe reports it as a JSON string
/// (`"12.345000"`); plain numbers are accepted too.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeReport {
    #[serde(default)]
    pub format: ProbeFormat,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeFormat {
    #[serde(default)]
    pub duration: Option<serde_json::Value>,
    #[serde(default)]
    pub format_name: Option<String>,
}

impl ProbeReport {
    /// Duration in seconds, validated to be finite and non-negative.
    pub fn duration_seconds(&self) -> Result<f64, ProcessingError> {
        let raw = self
            .format
            .duration
            .as_ref()
            .ok_or(ProcessingError::MissingDuration)?;

        let seconds = match raw {
            serde_json::Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ProcessingError::InvalidDuration(s.clone()))?,
            serde_json::Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| ProcessingError::InvalidDuration(n.to_string()))?,
            other => return Err(ProcessingError::InvalidDuration(other.to_string())),
        };

        if !seconds.is_finite() || seconds < 0.0 {
            return Err(ProcessingError::InvalidDuration(seconds.to_string()));
        }

        Ok(seconds)
    }
}

/// Extracts container metadata from a file on disk.
#[async_trait]
pub trait MediaProber: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<ProbeReport, ProcessingError>;
}
