//! Image processor - EXIF stripping and metadata extraction

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{PngDecoder, PngEncoder};
use image::codecs::webp::{WebPDecoder, WebPEncoder};
use image::{ColorType, DynamicImage, ImageFormat, ImageReader};

use super::orientation::ImageOrientation;
use crate::error::ProcessingError;
use crate::metadata::ImageMetadata;

const JPEG_QUALITY: u8 = 90;

pub struct ImageProcessor;

impl ImageProcessor {
    /// Bake the EXIF orientation into the pixels and re-encode without any metadata.
    ///
    /// The output keeps the source format. Still JPEG, PNG and WebP are
    /// supported. GIF and animated PNG/WebP would be flattened to their first
    /// frame, so they are [`ProcessingError::UnsupportedImageFormat`] like any
    /// other format.
    pub fn try_strip_exif(data: &[u8]) -> Result<Vec<u8>, ProcessingError> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let format = reader
            .format()
            .ok_or_else(|| ProcessingError::UnsupportedImageFormat("unknown".to_string()))?;

        if !matches!(
            format,
            ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP
        ) {
            return Err(ProcessingError::UnsupportedImageFormat(format!(
                "{:?}",
                format
            )));
        }

        if Self::is_animated(data, format)? {
            return Err(ProcessingError::UnsupportedImageFormat(format!(
                "animated {:?}",
                format
            )));
        }

        let img = reader.decode()?;
        let orientation = ImageOrientation::read(data);
        let img = ImageOrientation::apply(img, orientation);

        let mut output = Cursor::new(Vec::with_capacity(data.len()));
        match format {
            ImageFormat::Jpeg => {
                // JPEG has no alpha channel and only 8-bit samples
                let img = match img.color() {
                    ColorType::L8 | ColorType::Rgb8 => img,
                    _ => DynamicImage::ImageRgb8(img.to_rgb8()),
                };
                img.write_with_encoder(JpegEncoder::new_with_quality(&mut output, JPEG_QUALITY))?;
            }
            ImageFormat::Png => {
                img.write_with_encoder(PngEncoder::new(&mut output))?;
            }
            _ => {
                // The WebP encoder is lossless and only takes 8-bit RGB(A)
                let img = match img.color() {
                    ColorType::Rgb8 | ColorType::Rgba8 => img,
                    _ => DynamicImage::ImageRgba8(img.to_rgba8()),
                };
                img.write_with_encoder(WebPEncoder::new_lossless(&mut output))?;
            }
        }

        tracing::debug!(
            format = ?format,
            orientation = orientation,
            input_bytes = data.len(),
            output_bytes = output.get_ref().len(),
            "Stripped image metadata"
        );

        Ok(output.into_inner())
    }

    fn is_animated(data: &[u8], format: ImageFormat) -> Result<bool, ProcessingError> {
        let animated = match format {
            ImageFormat::Png => PngDecoder::new(Cursor::new(data))?.is_apng()?,
            ImageFormat::WebP => WebPDecoder::new(Cursor::new(data))?.has_animation(),
            _ => false,
        };
        Ok(animated)
    }

    /// Best-effort variant of [`Self::try_strip_exif`]: any failure hands back
    /// the original buffer unchanged.
    pub fn strip_exif(data: &Bytes) -> Bytes {
        match Self::try_strip_exif(data) {
            Ok(stripped) => Bytes::from(stripped),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    size_bytes = data.len(),
                    "EXIF stripping failed, keeping original image"
                );
                data.clone()
            }
        }
    }

    /// Dimensions, detected format and orientation tag, without a full decode.
    pub fn read_metadata(data: &[u8]) -> Result<ImageMetadata, ProcessingError> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let format = reader
            .format()
            .map(|f| format!("{:?}", f))
            .unwrap_or_else(|| "unknown".to_string());
        let (width, height) = reader.into_dimensions()?;
        let orientation = ImageOrientation::read(data);

        Ok(ImageMetadata {
            width,
            height,
            format,
            size_bytes: data.len() as u64,
            exif_orientation: if orientation != 1 {
                Some(orientation)
            } else {
                None
            },
        })
    }
}

/// Strip EXIF metadata (after applying its orientation), falling back to the input on failure.
pub fn strip_exif(data: &Bytes) -> Bytes {
    ImageProcessor::strip_exif(data)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use image::{Rgb, RgbImage};

    /// Encode a `width` x `height` RGB image in `format`.
    pub fn encode_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let mut img = RgbImage::from_pixel(width, height, Rgb([0, 0, 255]));
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, format)
            .unwrap();
        buffer.into_inner()
    }

    /// Minimal little-endian TIFF block holding only an Orientation tag.
    fn exif_app1(orientation: u16) -> Vec<u8> {
        let mut tiff = vec![0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
        tiff.extend_from_slice(&[0x01, 0x00]); // one IFD entry
        tiff.extend_from_slice(&[0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00]);
        tiff.extend_from_slice(&orientation.to_le_bytes());
        tiff.extend_from_slice(&[0x00, 0x00]);
        tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // no next IFD

        let mut payload = b"Exif\0\0".to_vec();
        payload.extend_from_slice(&tiff);

        let mut segment = vec![0xFF, 0xE1];
        segment.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        segment.extend_from_slice(&payload);
        segment
    }

    fn crc32(bytes: &[u8]) -> u32 {
        let mut crc = 0xFFFF_FFFFu32;
        for &b in bytes {
            crc ^= u32::from(b);
            for _ in 0..8 {
                crc = if crc & 1 != 0 {
                    (crc >> 1) ^ 0xEDB8_8320
                } else {
                    crc >> 1
                };
            }
        }
        !crc
    }

    /// PNG carrying an `acTL` chunk, which makes it an APNG for decoders.
    pub fn animated_png(width: u32, height: u32) -> Vec<u8> {
        let png = encode_image(width, height, ImageFormat::Png);
        // Signature (8) + IHDR (4 len + 4 type + 13 data + 4 crc)
        let ihdr_end = 8 + 25;

        let mut body = b"acTL".to_vec();
        body.extend_from_slice(&2u32.to_be_bytes()); // frames
        body.extend_from_slice(&0u32.to_be_bytes()); // loop forever

        let mut out = png[..ihdr_end].to_vec();
        out.extend_from_slice(&8u32.to_be_bytes());
        out.extend_from_slice(&body);
        out.extend_from_slice(&crc32(&body).to_be_bytes());
        out.extend_from_slice(&png[ihdr_end..]);
        out
    }

    fn riff_chunk(fourcc: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut chunk = fourcc.to_vec();
        chunk.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        chunk.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            chunk.push(0);
        }
        chunk
    }

    fn u24(value: u32) -> [u8; 3] {
        let b = value.to_le_bytes();
        [b[0], b[1], b[2]]
    }

    /// Two-frame animated WebP (VP8X + ANIM + ANMF) built from a lossless still.
    pub fn animated_webp(width: u32, height: u32) -> Vec<u8> {
        let still = encode_image(width, height, ImageFormat::WebP);
        let vp8l_at = still
            .windows(4)
            .position(|w| w == b"VP8L")
            .expect("lossless encoder writes a VP8L chunk");
        let frame_data = &still[vp8l_at..];

        let mut vp8x = vec![0x02, 0, 0, 0]; // animation flag
        vp8x.extend_from_slice(&u24(width - 1));
        vp8x.extend_from_slice(&u24(height - 1));

        let anim = [0u8, 0, 0, 0, 0, 0]; // background colour, loop count

        let mut anmf = Vec::new();
        anmf.extend_from_slice(&u24(0)); // x / 2
        anmf.extend_from_slice(&u24(0)); // y / 2
        anmf.extend_from_slice(&u24(width - 1));
        anmf.extend_from_slice(&u24(height - 1));
        anmf.extend_from_slice(&u24(100)); // duration ms
        anmf.push(0);
        anmf.extend_from_slice(frame_data);

        let mut body = b"WEBP".to_vec();
        body.extend(riff_chunk(b"VP8X", &vp8x));
        body.extend(riff_chunk(b"ANIM", &anim));
        body.extend(riff_chunk(b"ANMF", &anmf));
        body.extend(riff_chunk(b"ANMF", &anmf));

        let mut out = b"RIFF".to_vec();
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend(body);
        out
    }

    /// JPEG of `width` x `height` carrying an EXIF orientation tag.
    pub fn jpeg_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
        let jpeg = encode_image(width, height, ImageFormat::Jpeg);
        let mut out = jpeg[..2].to_vec(); // SOI
        out.extend_from_slice(&exif_app1(orientation));
        out.extend_from_slice(&jpeg[2..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use image::GenericImageView;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_orientation_is_read_from_exif() {
        let data = jpeg_with_orientation(4, 2, 6);
        assert_eq!(ImageOrientation::read(&data), 6);
        let metadata = ImageProcessor::read_metadata(&data).unwrap();
        assert_eq!(metadata.exif_orientation, Some(6));
        assert_eq!((metadata.width, metadata.height), (4, 2));
        assert_eq!(metadata.format, "Jpeg");
    }

    #[test]
    fn test_strip_exif_rotates_and_drops_metadata() {
        let data = jpeg_with_orientation(4, 2, 6);
        assert!(contains(&data, b"Exif\0\0"));

        let stripped = ImageProcessor::try_strip_exif(&data).unwrap();

        assert!(!contains(&stripped, b"Exif\0\0"));
        assert_eq!(ImageOrientation::read(&stripped), 1);
        let decoded = image::load_from_memory(&stripped).unwrap();
        assert_eq!(decoded.dimensions(), (2, 4));
    }

    #[test]
    fn test_strip_exif_keeps_png_format() {
        let data = encode_image(5, 3, ImageFormat::Png);
        let stripped = ImageProcessor::try_strip_exif(&data).unwrap();
        assert_eq!(
            image::guess_format(&stripped).unwrap(),
            ImageFormat::Png
        );
        let decoded = image::load_from_memory(&stripped).unwrap();
        assert_eq!(decoded.dimensions(), (5, 3));
    }

    #[test]
    fn test_strip_exif_keeps_webp_format() {
        let data = encode_image(6, 4, ImageFormat::WebP);
        let stripped = ImageProcessor::try_strip_exif(&data).unwrap();
        assert_eq!(
            image::guess_format(&stripped).unwrap(),
            ImageFormat::WebP
        );
    }

    #[test]
    fn test_gif_is_unsupported() {
        let data = b"GIF89a\x01\x00\x01\x00\x80\x00\x00".to_vec();
        assert!(matches!(
            ImageProcessor::try_strip_exif(&data),
            Err(ProcessingError::UnsupportedImageFormat(_))
        ));
        let original = Bytes::from(data);
        assert_eq!(strip_exif(&original), original);
    }

    #[test]
    fn test_apng_is_kept_animated() {
        let data = animated_png(3, 3);
        assert!(contains(&data, b"acTL"));
        assert!(matches!(
            ImageProcessor::try_strip_exif(&data),
            Err(ProcessingError::UnsupportedImageFormat(_))
        ));

        let original = Bytes::from(data);
        let out = strip_exif(&original);
        assert_eq!(out, original);
        assert!(contains(&out, b"acTL"));
    }

    #[test]
    fn test_animated_webp_is_kept_animated() {
        let data = animated_webp(2, 2);
        assert!(ImageProcessor::try_strip_exif(&data).is_err());

        let original = Bytes::from(data);
        assert_eq!(strip_exif(&original), original);
    }

    #[test]
    fn test_still_png_is_not_animated() {
        let data = encode_image(3, 3, ImageFormat::Png);
        assert!(!ImageProcessor::is_animated(&data, ImageFormat::Png).unwrap());
        let data = encode_image(3, 3, ImageFormat::WebP);
        assert!(!ImageProcessor::is_animated(&data, ImageFormat::WebP).unwrap());
    }

    #[test]
    fn test_corrupt_buffer_is_returned_unchanged() {
        let corrupt = Bytes::from_static(b"\xFF\xD8\xFF\xE0 this is not really a jpeg");
        assert!(ImageProcessor::try_strip_exif(&corrupt).is_err());
        let out = strip_exif(&corrupt);
        assert_eq!(out, corrupt);

        let garbage = Bytes::from_static(b"definitely not an image");
        assert_eq!(strip_exif(&garbage), garbage);
        assert_eq!(strip_exif(&Bytes::new()), Bytes::new());
    }

    #[test]
    fn test_read_metadata_invalid_image() {
        assert!(ImageProcessor::read_metadata(b"not an image").is_err());
    }

    #[test]
    fn test_read_metadata_without_exif() {
        let data = encode_image(10, 20, ImageFormat::Png);
        let metadata = ImageProcessor::read_metadata(&data).unwrap();
        assert_eq!((metadata.width, metadata.height), (10, 20));
        assert_eq!(metadata.format, "Png");
        assert_eq!(metadata.exif_orientation, None);
        assert_eq!(metadata.size_bytes, data.len() as u64);
    }
}
