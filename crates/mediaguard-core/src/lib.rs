//! Mediaguard Core Library
//!
//! This crate provides the error taxonomy and configuration shared by the
//! media ingestion pipeline and its command-line front end.

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{ProcessingConfig, ScanAction, SignaturePolicy};
pub use error::{AppError, ErrorMetadata, LogLevel};
