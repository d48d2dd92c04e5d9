//! mediaguard: run the upload ingestion stages against local files.
//!
//! Configuration comes from the environment (see `ProcessingConfig::from_env`).
//! Results are printed as JSON on stdout; logs go to stderr.

use std::path::{Path, PathBuf};

use anyhow::Context;
use bytes::Bytes;
use clap::{Parser, Subcommand};
use mediaguard_cli::{guess_mime, init_tracing};
use mediaguard_core::{AppError, ErrorMetadata, LogLevel, ProcessingConfig};
use mediaguard_processing::{
    estimate_duration, sanitize_filename, strip_exif, ContentScanner, DurationExtractor,
    IngestPipeline, SignatureValidator, VideoDuration,
};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "mediaguard", about = "Validate and sanitize media uploads")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the storage-safe name for an uploaded filename
    Sanitize {
        /// Filename as supplied by the client
        name: String,
    },
    /// Verify a file's magic bytes against its declared type
    Check {
        file: PathBuf,
        /// Declared MIME type (guessed from the extension if omitted)
        #[arg(long)]
        mime: Option<String>,
    },
    /// Scan a file for embedded active content
    Scan { file: PathBuf },
    /// Write an EXIF-free, upright copy of an image
    StripExif { input: PathBuf, output: PathBuf },
    /// Probe a video's duration
    Duration { file: PathBuf },
    /// Run the full ingest pipeline on a file
    Ingest {
        file: PathBuf,
        /// Declared MIME type (guessed from the extension if omitted)
        #[arg(long)]
        mime: Option<String>,
        /// Write the sanitized bytes here
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct Rejection<'a> {
    accepted: bool,
    error_type: &'a str,
    error_code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggested_action: Option<&'static str>,
    recoverable: bool,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

async fn read_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn resolve_mime(path: &Path, mime: Option<String>) -> anyhow::Result<String> {
    match mime {
        Some(mime) => Ok(mime),
        None => guess_mime(path).map(str::to_string).with_context(|| {
            format!(
                "Cannot guess MIME type of {}; pass --mime",
                path.display()
            )
        }),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn reject(err: &AppError) -> anyhow::Result<()> {
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(error = %err, "Upload rejected"),
        LogLevel::Warn => tracing::warn!(error = %err, "Upload rejected"),
        LogLevel::Error => tracing::error!(error = %err, "Upload rejected"),
    }
    print_json(&Rejection {
        accepted: false,
        error_type: err.error_type(),
        error_code: err.error_code(),
        message: err.client_message(),
        suggested_action: err.suggested_action(),
        recoverable: err.is_recoverable(),
    })?;
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = ProcessingConfig::from_env().context("Invalid configuration")?;

    match cli.command {
        Commands::Sanitize { name } => {
            print_json(&serde_json::json!({
                "original": name,
                "sanitized": sanitize_filename(&name),
            }))?;
        }
        Commands::Check { file, mime } => {
            let mime = resolve_mime(&file, mime)?;
            let data = read_file(&file).await?;
            let validator = SignatureValidator::new(config.signature_policy);
            print_json(&serde_json::json!({
                "mime": mime,
                "policy": config.signature_policy,
                "valid": validator.is_valid(&data, &mime),
            }))?;
        }
        Commands::Scan { file } => {
            let data = read_file(&file).await?;
            print_json(&ContentScanner::new().scan(&data))?;
        }
        Commands::StripExif { input, output } => {
            let data = Bytes::from(read_file(&input).await?);
            let stripped = tokio::task::spawn_blocking({
                let data = data.clone();
                move || strip_exif(&data)
            })
            .await
            .context("EXIF stripping task failed")?;
            tokio::fs::write(&output, &stripped)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;
            print_json(&serde_json::json!({
                "input_bytes": data.len(),
                "output_bytes": stripped.len(),
                "stripped": stripped != data,
            }))?;
        }
        Commands::Duration { file } => {
            let data = read_file(&file).await?;
            let extractor = DurationExtractor::from_config(&config)?;
            let duration = match extractor.extract_duration(&data).await {
                Some(seconds) => VideoDuration {
                    seconds,
                    estimated: false,
                },
                None => VideoDuration {
                    seconds: estimate_duration(data.len(), config.estimated_video_bytes_per_sec),
                    estimated: true,
                },
            };
            print_json(&duration)?;
        }
        Commands::Ingest { file, mime, out } => {
            let mime = resolve_mime(&file, mime)?;
            let data = Bytes::from(read_file(&file).await?);
            let pipeline = IngestPipeline::from_config(config)?;

            match pipeline.ingest(&file_name(&file), &mime, data).await {
                Ok(upload) => {
                    if let Some(out) = out {
                        tokio::fs::write(&out, &upload.data)
                            .await
                            .with_context(|| format!("Failed to write {}", out.display()))?;
                    }
                    print_json(&upload)?;
                }
                Err(e) => reject(&e)?,
            }
        }
    }

    Ok(())
}
