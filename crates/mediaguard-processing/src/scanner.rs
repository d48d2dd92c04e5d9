//! Heuristic scan for active content hidden in uploads.
//!
//! The pattern list is small. It over-flags binary media that happens to
//! contain one of the byte sequences and misses trivially obfuscated
//! payloads. It is a first line of defense, not a security boundary.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::bytes::Regex;
use serde::Serialize;

use crate::traits::UploadScanner;

pub const SUSPICIOUS_REASON: &str = "Suspicious content detected";
pub const CLEAN_REASON: &str = "No suspicious content found";

/// Checked in order; the first hit wins.
const SUSPICIOUS_PATTERNS: [&str; 5] = [
    "<script",
    "javascript:",
    "vbscript:",
    "onload=",
    "onerror=",
];

static COMPILED_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    SUSPICIOUS_PATTERNS
        .iter()
        .map(|p| {
            // ASCII-only case folding: `ſ` or the Kelvin sign must not match.
            let re = Regex::new(&format!("(?i-u){}", regex::escape(p)))
                .expect("escaped literal is a valid regex");
            (*p, re)
        })
        .collect()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    pub is_safe: bool,
    pub reason: String,
    /// Pattern that triggered the verdict, for logs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_pattern: Option<&'static str>,
}

impl ScanResult {
    fn clean() -> Self {
        Self {
            is_safe: true,
            reason: CLEAN_REASON.to_string(),
            matched_pattern: None,
        }
    }

    fn suspicious(pattern: &'static str) -> Self {
        Self {
            is_safe: false,
            reason: SUSPICIOUS_REASON.to_string(),
            matched_pattern: Some(pattern),
        }
    }
}

/// Scan the raw bytes of `buffer` for the suspicious patterns. Binary data
/// around a match does not hide it.
pub fn scan(buffer: &[u8]) -> ScanResult {
    COMPILED_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(buffer))
        .map(|(pattern, _)| ScanResult::suspicious(pattern))
        .unwrap_or_else(ScanResult::clean)
}

/// Content scanner usable as the pipeline's [`UploadScanner`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ContentScanner;

impl ContentScanner {
    pub fn new() -> Self {
        Self
    }

    pub fn scan(&self, buffer: &[u8]) -> ScanResult {
        let result = scan(buffer);
        if !result.is_safe {
            tracing::warn!(
                pattern = result.matched_pattern.unwrap_or_default(),
                size_bytes = buffer.len(),
                "Content scan flagged upload"
            );
        }
        result
    }
}

#[async_trait]
impl UploadScanner for ContentScanner {
    async fn scan(&self, data: &[u8]) -> ScanResult {
        ContentScanner::scan(self, data)
    }
}
