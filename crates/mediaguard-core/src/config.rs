//! Configuration module
//!
//! Settings for the ingest pipeline: where the prober lives, how long a
//! probe may run, which signature checks apply, and the size/type limits
//! enforced before any media work happens.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

const FFPROBE_PATH: &str = "ffprobe";
const PROBE_TIMEOUT_SECS: u64 = 30;
const MAX_IMAGE_SIZE_MB: usize = 10;
const MAX_VIDEO_SIZE_MB: usize = 500;
const ESTIMATED_VIDEO_BYTES_PER_SEC: u64 = 250_000;
const BYTES_PER_MB: usize = 1024 * 1024;
const ALLOWED_CONTENT_TYPES: &str =
    "image/jpeg,image/png,image/gif,image/webp,video/mp4,video/webm,video/quicktime";

/// Which declared types get byte-level signature verification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignaturePolicy {
    /// Only `image/jpeg` and `image/png` are verified; every other type is trusted.
    #[default]
    JpegPng,
    /// Also verifies GIF, WebP, MP4/QuickTime and WebM/Matroska containers.
    Extended,
}

impl FromStr for SignaturePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jpeg_png" | "jpeg-png" | "default" => Ok(Self::JpegPng),
            "extended" => Ok(Self::Extended),
            other => Err(format!(
                "Invalid signature policy '{}': expected 'jpeg_png' or 'extended'",
                other
            )),
        }
    }
}

/// What the ingest pipeline does with a buffer the content scanner flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanAction {
    #[default]
    Reject,
    /// Accept the upload and carry the scan result for the caller to act on.
    Flag,
}

impl FromStr for ScanAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "flag" => Ok(Self::Flag),
            other => Err(format!(
                "Invalid scan action '{}': expected 'reject' or 'flag'",
                other
            )),
        }
    }
}

/// Ingest pipeline configuration
#[derive(Clone, Debug)]
pub struct ProcessingConfig {
    pub ffprobe_path: String,
    pub probe_timeout: Duration,
    /// Directory for the short-lived files handed to the prober.
    pub temp_dir: PathBuf,
    pub remove_exif: bool,
    pub signature_policy: SignaturePolicy,
    pub scan_action: ScanAction,
    pub max_image_size_bytes: usize,
    pub max_video_size_bytes: usize,
    pub allowed_content_types: Vec<String>,
    /// Used to estimate a duration when probing fails.
    pub estimated_video_bytes_per_sec: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            ffprobe_path: FFPROBE_PATH.to_string(),
            probe_timeout: Duration::from_secs(PROBE_TIMEOUT_SECS),
            temp_dir: env::temp_dir(),
            remove_exif: true,
            signature_policy: SignaturePolicy::default(),
            scan_action: ScanAction::default(),
            max_image_size_bytes: MAX_IMAGE_SIZE_MB * BYTES_PER_MB,
            max_video_size_bytes: MAX_VIDEO_SIZE_MB * BYTES_PER_MB,
            allowed_content_types: parse_list(ALLOWED_CONTENT_TYPES),
            estimated_video_bytes_per_sec: ESTIMATED_VIDEO_BYTES_PER_SEC,
        }
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(key: &str, value: &str) -> Result<bool, AppError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::Config(format!(
            "{} must be true or false, got '{}'",
            key, value
        ))),
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, AppError> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{} must be a whole number, got '{}'", key, value)))
}

fn megabytes_to_bytes(key: &str, megabytes: usize) -> Result<usize, AppError> {
    megabytes
        .checked_mul(BYTES_PER_MB)
        .ok_or_else(|| AppError::Config(format!("{} is too large: {} MB", key, megabytes)))
}

/// Validate that a binary path doesn't contain shell metacharacters or traversal sequences
pub fn validate_binary_path(path: &str) -> Result<(), AppError> {
    if path.trim().is_empty() {
        return Err(AppError::Config("Binary path must not be empty".to_string()));
    }

    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(AppError::Config(format!(
            "Binary path contains dangerous characters: {}",
            path
        )));
    }

    if path.contains("..") {
        return Err(AppError::Config(format!(
            "Binary path contains directory traversal: {}",
            path
        )));
    }

    Ok(())
}

impl ProcessingConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| env::var(key).ok())?;
        tracing::debug!(config = ?config, "Loaded processing configuration");
        Ok(config)
    }

    /// Build a config from `lookup(key)`, falling back to defaults for unset keys.
    ///
    /// A key that is set but unparsable is an error, never a silent default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let signature_policy = match lookup("SIGNATURE_POLICY") {
            Some(v) => v.parse().map_err(AppError::Config)?,
            None => defaults.signature_policy,
        };

        let scan_action = match lookup("SCAN_ACTION") {
            Some(v) => v.parse().map_err(AppError::Config)?,
            None => defaults.scan_action,
        };

        let probe_timeout = match lookup("PROBE_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_number("PROBE_TIMEOUT_SECS", &v)?),
            None => defaults.probe_timeout,
        };

        let remove_exif = match lookup("REMOVE_EXIF") {
            Some(v) => parse_bool("REMOVE_EXIF", &v)?,
            None => defaults.remove_exif,
        };

        let max_image_size_bytes = match lookup("MAX_IMAGE_SIZE_MB") {
            Some(v) => megabytes_to_bytes(
                "MAX_IMAGE_SIZE_MB",
                parse_number("MAX_IMAGE_SIZE_MB", &v)?,
            )?,
            None => defaults.max_image_size_bytes,
        };

        let max_video_size_bytes = match lookup("MAX_VIDEO_SIZE_MB") {
            Some(v) => megabytes_to_bytes(
                "MAX_VIDEO_SIZE_MB",
                parse_number("MAX_VIDEO_SIZE_MB", &v)?,
            )?,
            None => defaults.max_video_size_bytes,
        };

        let estimated_video_bytes_per_sec = match lookup("ESTIMATED_VIDEO_BYTES_PER_SEC") {
            Some(v) => parse_number("ESTIMATED_VIDEO_BYTES_PER_SEC", &v)?,
            None => defaults.estimated_video_bytes_per_sec,
        };

        let config = Self {
            ffprobe_path: lookup("FFPROBE_PATH").unwrap_or(defaults.ffprobe_path),
            probe_timeout,
            temp_dir: lookup("MEDIA_TEMP_DIR")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.temp_dir),
            remove_exif,
            signature_policy,
            scan_action,
            max_image_size_bytes,
            max_video_size_bytes,
            allowed_content_types: lookup("ALLOWED_CONTENT_TYPES")
                .map(|v| parse_list(&v))
                .unwrap_or(defaults.allowed_content_types),
            estimated_video_bytes_per_sec,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        validate_binary_path(&self.ffprobe_path)
            .map_err(|e| AppError::Config(format!("Invalid FFPROBE_PATH: {}", e)))?;

        if self.probe_timeout.is_zero() {
            return Err(AppError::Config(
                "PROBE_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        if self.allowed_content_types.is_empty() {
            return Err(AppError::Config(
                "ALLOWED_CONTENT_TYPES must list at least one content type".to_string(),
            ));
        }

        if self.estimated_video_bytes_per_sec == 0 {
            return Err(AppError::Config(
                "ESTIMATED_VIDEO_BYTES_PER_SEC must be greater than 0".to_string(),
            ));
        }

        if self.max_image_size_bytes == 0 || self.max_video_size_bytes == 0 {
            return Err(AppError::Config(
                "Maximum file sizes must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether the declared content type is on the allowlist (case-insensitive, parameters ignored)
    pub fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();
        self.allowed_content_types.iter().any(|ct| ct == &essence)
    }
}
