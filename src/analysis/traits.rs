//! Collaborator seams around the numeric core
//!
//! Decoding and onset detection are external tools; the core only sees
//! their results through these traits, so it can be driven with synthetic
//! inputs in tests.

use crate::error::Result;
use crate::external::OnsetMethod;
use crate::model::{BeatSet, SampleStream};
use std::path::Path;

/// Turns an audio file into a mono sample stream
pub trait AudioDecoder {
    /// Decode at most the first `duration` seconds of `audio_path`
    fn decode(&self, audio_path: &Path, duration: f64) -> Result<SampleStream>;
}

/// Produces onset timestamps for an audio file
pub trait OnsetDetector {
    /// Detect onsets at the given sensitivity threshold with `method`
    fn detect(&self, audio_path: &Path, sensitivity: f32, method: OnsetMethod) -> Result<BeatSet>;
}

impl<T: AudioDecoder + ?Sized> AudioDecoder for Box<T> {
    fn decode(&self, audio_path: &Path, duration: f64) -> Result<SampleStream> {
        (**self).decode(audio_path, duration)
    }
}

impl<T: OnsetDetector + ?Sized> OnsetDetector for Box<T> {
    fn detect(&self, audio_path: &Path, sensitivity: f32, method: OnsetMethod) -> Result<BeatSet> {
        (**self).detect(audio_path, sensitivity, method)
    }
}

impl<T: AudioDecoder + ?Sized> AudioDecoder for &T {
    fn decode(&self, audio_path: &Path, duration: f64) -> Result<SampleStream> {
        (**self).decode(audio_path, duration)
    }
}

impl<T: OnsetDetector + ?Sized> OnsetDetector for &T {
    fn detect(&self, audio_path: &Path, sensitivity: f32, method: OnsetMethod) -> Result<BeatSet> {
        (**self).detect(audio_path, sensitivity, method)
    }
}
