//! Image processing module
//!
//! - EXIF orientation reading and baking (orientation)
//! - Metadata stripping and lightweight metadata extraction (processor)

pub mod orientation;
pub mod processor;

pub use orientation::ImageOrientation;
pub use processor::{strip_exif, ImageProcessor};
