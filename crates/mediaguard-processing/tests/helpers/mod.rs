//! Test helpers: fixture media, fake probers and pipeline builders.

#![allow(dead_code)]

pub mod fixtures;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mediaguard_core::ProcessingConfig;
use mediaguard_processing::{
    DurationExtractor, IngestPipeline, MediaProber, ProbeReport, ProcessingError,
};

/// Prober that reads the temp file back and reports the duration written in
/// it as `duration=<seconds>`. Anything else is a probe failure.
#[derive(Default)]
pub struct ContentsProber {
    seen: Mutex<Vec<PathBuf>>,
}

impl ContentsProber {
    pub fn seen_paths(&self) -> Vec<PathBuf> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaProber for ContentsProber {
    async fn probe(&self, path: &Path) -> Result<ProbeReport, ProcessingError> {
        self.seen.lock().unwrap().push(path.to_path_buf());

        let contents = tokio::fs::read_to_string(path).await?;
        // Yield so concurrent calls interleave while their files exist.
        tokio::task::yield_now().await;

        let duration = contents
            .strip_prefix("duration=")
            .ok_or(ProcessingError::MissingDuration)?;
        Ok(serde_json::from_value(serde_json::json!({
            "format": { "duration": duration.trim() }
        }))?)
    }
}

/// Config rooted at `temp_dir` with defaults otherwise.
pub fn test_config(temp_dir: &Path) -> ProcessingConfig {
    ProcessingConfig {
        temp_dir: temp_dir.to_path_buf(),
        ..Default::default()
    }
}

pub fn pipeline_with_prober(config: ProcessingConfig, prober: Arc<dyn MediaProber>) -> IngestPipeline {
    let extractor = DurationExtractor::new(prober, config.temp_dir.clone());
    IngestPipeline::new(config, extractor)
}

/// Number of entries left in `dir`.
pub fn entries_in(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
