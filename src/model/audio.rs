use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// Mono PCM audio at a known sample rate, amplitudes normalized to [-1, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct SampleStream {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SampleStream {
    /// Wrap already-mono float samples
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidConfiguration(
                "sample rate must be positive".to_string(),
            ));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Build from interleaved float frames, averaging channels per frame
    pub fn from_interleaved(samples: &[f32], channels: usize, sample_rate: u32) -> Result<Self> {
        Self::downmix(samples, channels, sample_rate, |s| s)
    }

    /// Build from interleaved 16-bit PCM (scaled by 1/32768)
    pub fn from_i16(samples: &[i16], channels: usize, sample_rate: u32) -> Result<Self> {
        Self::downmix(samples, channels, sample_rate, |s| s as f32 / 32768.0)
    }

    /// Build from interleaved 32-bit PCM (scaled by 1/2^31)
    pub fn from_i32(samples: &[i32], channels: usize, sample_rate: u32) -> Result<Self> {
        Self::downmix(samples, channels, sample_rate, |s| {
            (s as f64 / 2_147_483_648.0) as f32
        })
    }

    fn downmix<T: Copy>(
        samples: &[T],
        channels: usize,
        sample_rate: u32,
        to_f32: impl Fn(T) -> f32,
    ) -> Result<Self> {
        if channels == 0 {
            return Err(AnalysisError::InvalidConfiguration(
                "channel count must be positive".to_string(),
            ));
        }

        let mono: Vec<f32> = if channels == 1 {
            samples.iter().map(|&s| to_f32(s)).collect()
        } else {
            samples
                .chunks(channels)
                .map(|frame| frame.iter().map(|&s| to_f32(s)).sum::<f32>() / frame.len() as f32)
                .collect()
        };

        Self::new(mono, sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length of the stream in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Samples covering at most the first `duration` seconds
    pub fn head(&self, duration: f64) -> &[f32] {
        let limit = (duration * self.sample_rate as f64).round();
        if limit >= self.samples.len() as f64 {
            &self.samples
        } else {
            &self.samples[..limit.max(0.0) as usize]
        }
    }
}

/// One point of the RMS energy curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopePoint {
    /// Window start, in seconds
    pub time: f64,

    /// RMS energy of the window
    pub amplitude: f32,
}

/// RMS energy over time, ordered by timestamp
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    points: Vec<EnvelopePoint>,
}

impl Envelope {
    pub(crate) fn from_points(points: Vec<EnvelopePoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[EnvelopePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Loudest window, if any
    pub fn peak(&self) -> Option<EnvelopePoint> {
        self.points
            .iter()
            .copied()
            .max_by(|a, b| a.amplitude.total_cmp(&b.amplitude))
    }
}
