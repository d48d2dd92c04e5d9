//! Storage-safe filenames derived from client-supplied names.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

const MAX_BASE_LEN: usize = 100;
const MAX_EXTENSION_LEN: usize = 16;
const FALLBACK_BASE: &str = "file";

/// Any run of characters that may not appear inside a name segment.
static DISALLOWED_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("static regex is valid"));

/// Lower-case `segment` and collapse every run of characters outside `[a-z0-9]`
/// into a single hyphen, without leading or trailing hyphens.
fn normalize_segment(segment: &str, max_len: usize) -> String {
    let lowered = segment.to_lowercase();
    let replaced = DISALLOWED_RUN.replace_all(&lowered, "-");
    let trimmed = replaced.trim_matches('-');
    // Only ASCII survives the regex, so byte slicing is on a char boundary.
    let capped = &trimmed[..trimmed.len().min(max_len)];
    capped.trim_end_matches('-').to_string()
}

/// `{unix_millis}-{8 hex chars}`, used as the collision guard.
fn unique_suffix() -> String {
    let mut bytes = [0u8; 4];
    rand::rng().fill(&mut bytes);
    format!(
        "{}-{}",
        chrono::Utc::now().timestamp_millis(),
        hex::encode(bytes)
    )
}

/// Build a filesystem-safe, collision-resistant name from arbitrary user input.
///
/// The result is `{base}-{unix_millis}-{random hex}{.ext}` and only ever
/// contains `[a-z0-9.-]`. The extension is the last `.`-delimited segment of
/// the input (when one exists and survives normalization). Dots inside the
/// base are turned into hyphens so the only dot left is the extension's.
/// An input that normalizes to nothing gets the base `file`.
///
/// The random token comes from the thread-local CSPRNG. It guards against
/// name collisions; it is not a secret.
pub fn sanitize_filename(original_name: &str) -> String {
    let (stem, extension) = match original_name.rsplit_once('.') {
        Some((stem, ext)) => {
            let ext = normalize_segment(ext, MAX_EXTENSION_LEN);
            let ext = if ext.is_empty() {
                String::new()
            } else {
                format!(".{}", ext)
            };
            (stem, ext)
        }
        None => (original_name, String::new()),
    };

    let base = normalize_segment(stem, MAX_BASE_LEN);
    let base = if base.is_empty() {
        FALLBACK_BASE
    } else {
        base.as_str()
    };

    format!("{}-{}{}", base, unique_suffix(), extension)
}
