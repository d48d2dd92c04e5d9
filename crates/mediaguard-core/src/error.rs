//! Error types module
//!
//! This module provides the error type returned at the ingest boundary. The
//! individual pipeline stages report validation outcomes as plain values and
//! absorb best-effort failures; `AppError` only appears where a caller asked
//! for an accept/reject decision.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for rejected content worth an operator's attention
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// by the upload handler that owns the HTTP surface.
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "SUSPICIOUS_CONTENT")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Empty file")]
    EmptyFile,

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Suspicious content: {0}")]
    SuspiciousContent(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (u16, &'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check that the file matches its declared type"),
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge { .. } => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size and try again"),
            LogLevel::Debug,
        ),
        AppError::EmptyFile => (
            400,
            "EMPTY_FILE",
            false,
            Some("Select a non-empty file"),
            LogLevel::Debug,
        ),
        AppError::UnsupportedMediaType(_) => (
            415,
            "UNSUPPORTED_MEDIA_TYPE",
            false,
            Some("Upload an image or video in a supported format"),
            LogLevel::Debug,
        ),
        AppError::SuspiciousContent(_) => (
            422,
            "SUSPICIOUS_CONTENT",
            false,
            None,
            LogLevel::Warn,
        ),
        AppError::Config(_) => (
            500,
            "CONFIGURATION_ERROR",
            false,
            Some("Fix the named setting and restart"),
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::PayloadTooLarge { .. } => "PayloadTooLarge",
            AppError::EmptyFile => "EmptyFile",
            AppError::UnsupportedMediaType(_) => "UnsupportedMediaType",
            AppError::SuspiciousContent(_) => "SuspiciousContent",
            AppError::Config(_) => "Config",
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::PayloadTooLarge { size, max } => {
                format!("File too large: {} bytes exceeds limit of {} bytes", size, max)
            }
            AppError::EmptyFile => "Uploaded file is empty".to_string(),
            AppError::UnsupportedMediaType(ref ct) => format!("Unsupported media type: {}", ct),
            // Matched pattern stays in the logs.
            AppError::SuspiciousContent(_) => "File rejected: suspicious content".to_string(),
            AppError::Config(ref msg) => format!("Invalid configuration: {}", msg),
        }
    }
}
