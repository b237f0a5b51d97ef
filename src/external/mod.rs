//! External collaborators: audio decoders and the onset detector
//!
//! Each tool is invoked synchronously and either returns a complete result
//! or fails; nothing here retries.

mod aubio;
mod decoder;
mod ffmpeg;

pub use aubio::{parse_onset_output, AubioOnsetDetector, OnsetMethod, DEFAULT_SENSITIVITY};
pub use decoder::SymphoniaDecoder;
pub use ffmpeg::{FfmpegDecoder, FFMPEG_SAMPLE_RATE};
