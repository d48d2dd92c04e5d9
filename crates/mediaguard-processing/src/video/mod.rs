//! Video processing module
//!
//! Duration probing for uploaded videos: the buffer is handed to an external
//! prober through a short-lived temp file that is removed on every exit path.

pub mod duration;
pub mod probe;
pub mod temp_file;

pub use duration::{estimate_duration, DurationExtractor};
pub use probe::FfprobeProber;
pub use temp_file::TempMediaFile;
