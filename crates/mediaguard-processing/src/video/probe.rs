//! ffprobe-backed [`MediaProber`]

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use tokio::process::Command;

use mediaguard_core::config::validate_binary_path;
use mediaguard_core::ProcessingConfig;

use crate::error::ProcessingError;
use crate::traits::{MediaProber, ProbeReport};

const MAX_STDERR_CHARS: usize = 512;

pub struct FfprobeProber {
    ffprobe_path: String,
    timeout: Duration,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let ffprobe_path = ffprobe_path.into();
        validate_binary_path(&ffprobe_path).context("Invalid ffprobe_path")?;

        Ok(Self {
            ffprobe_path,
            timeout,
        })
    }

    pub fn from_config(config: &ProcessingConfig) -> anyhow::Result<Self> {
        Self::new(config.ffprobe_path.clone(), config.probe_timeout)
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe(&self, path: &Path) -> Result<ProbeReport, ProcessingError> {
        let start = Instant::now();

        let child = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_format"])
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| ProcessingError::ProbeTimeout(self.timeout))?
            .map_err(|source| ProcessingError::ProbeSpawn {
                program: self.ffprobe_path.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr: String = String::from_utf8_lossy(&output.stderr)
                .trim()
                .chars()
                .take(MAX_STDERR_CHARS)
                .collect();
            return Err(ProcessingError::ProbeFailed {
                status: output.status.to_string(),
                stderr,
            });
        }

        let report: ProbeReport = serde_json::from_slice(&output.stdout)?;

        tracing::debug!(
            duration_ms = start.elapsed().as_millis(),
            format_name = report.format.format_name.as_deref().unwrap_or("unknown"),
            "Probe completed"
        );

        Ok(report)
    }
}
