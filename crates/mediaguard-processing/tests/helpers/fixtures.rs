//! Test fixtures: encoded images, EXIF-tagged JPEGs and fake video payloads.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

/// Encode a `width` x `height` RGB image in `format`. Pixel (0, 0) is red,
/// the rest blue.
pub fn encode_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut img = RgbImage::from_pixel(width, height, Rgb([0, 0, 255]));
    img.put_pixel(0, 0, Rgb([255, 0, 0]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, format)
        .unwrap();
    buffer.into_inner()
}

/// JPEG with an APP1 segment holding an Orientation tag and a camera model.
pub fn jpeg_with_exif(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    let model = b"PhoneCam\0";

    // Little-endian TIFF: header, IFD0 with Orientation and Model, model string.
    let mut tiff = vec![0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
    tiff.extend_from_slice(&2u16.to_le_bytes());
    // Model (0x0110), ASCII, stored after the IFD at offset 8 + 2 + 24 + 4
    tiff.extend_from_slice(&[0x10, 0x01, 0x02, 0x00]);
    tiff.extend_from_slice(&(model.len() as u32).to_le_bytes());
    tiff.extend_from_slice(&38u32.to_le_bytes());
    // Orientation (0x0112), SHORT, inline
    tiff.extend_from_slice(&[0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00]);
    tiff.extend_from_slice(&orientation.to_le_bytes());
    tiff.extend_from_slice(&[0x00, 0x00]);
    tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    tiff.extend_from_slice(model);

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&tiff);

    let jpeg = encode_image(width, height, ImageFormat::Jpeg);
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Video payload whose duration only the fake prober can read.
pub fn fake_mp4(duration: &str) -> Vec<u8> {
    format!("duration={}", duration).into_bytes()
}

pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
