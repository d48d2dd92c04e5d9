//! Magic-byte verification of declared media types.
//!
//! Only JPEG and PNG are checked under the default policy. Every other
//! declared type, including all video types, GIF and WebP, passes as-is.
//! That gap is a known limitation; [`SignaturePolicy::Extended`] closes part
//! of it for deployments that opt in.

use mediaguard_core::SignaturePolicy;

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8];
const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47];
const PNG_MIN_LEN: usize = 8;
const EBML_MAGIC: &[u8] = &[0x1A, 0x45, 0xDF, 0xA3];

/// Lower-cased MIME type without parameters (`video/mp4; codecs=...` -> `video/mp4`).
pub(crate) fn mime_essence(declared_mime: &str) -> String {
    declared_mime
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

/// Verifies that a buffer's leading bytes match its declared MIME type.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignatureValidator {
    policy: SignaturePolicy,
}

impl SignatureValidator {
    pub fn new(policy: SignaturePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> SignaturePolicy {
        self.policy
    }

    /// `true` when `buffer` may be the declared type. Never panics; a buffer
    /// too short for a checked signature is simply `false`.
    pub fn is_valid(&self, buffer: &[u8], declared_mime: &str) -> bool {
        let mime = mime_essence(declared_mime);

        match mime.as_str() {
            "image/jpeg" => buffer.len() >= JPEG_MAGIC.len() && buffer.starts_with(JPEG_MAGIC),
            "image/png" => buffer.len() >= PNG_MIN_LEN && buffer.starts_with(PNG_MAGIC),
            _ => match self.policy {
                SignaturePolicy::JpegPng => true,
                SignaturePolicy::Extended => extended_signature_matches(buffer, &mime),
            },
        }
    }
}

fn extended_signature_matches(buffer: &[u8], mime: &str) -> bool {
    match mime {
        "image/gif" => buffer.starts_with(b"GIF87a") || buffer.starts_with(b"GIF89a"),
        "image/webp" => {
            buffer.len() >= 12 && buffer.starts_with(b"RIFF") && &buffer[8..12] == b"WEBP"
        }
        // ISO base media: box size then `ftyp`
        "video/mp4" | "video/quicktime" | "video/x-m4v" => {
            buffer.len() >= 12 && &buffer[4..8] == b"ftyp"
        }
        "video/webm" | "video/x-matroska" => buffer.starts_with(EBML_MAGIC),
        _ => true,
    }
}

/// Default-policy check: JPEG and PNG signatures are verified, everything else is trusted.
pub fn is_valid_type(buffer: &[u8], declared_mime: &str) -> bool {
    SignatureValidator::default().is_valid(buffer, declared_mime)
}
