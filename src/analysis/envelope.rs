//! RMS envelope extraction
//!
//! 10 ms windows advanced by a quarter window (75% overlap). The trailing
//! windows may be shorter than a full window but are never empty.

use crate::error::{AnalysisError, Result};
use crate::model::{Envelope, EnvelopePoint, SampleStream};

/// Analysis window length in seconds
pub const WINDOW_SECS: f64 = 0.01;

/// Window and hop sizes in samples for a sample rate
pub fn window_and_hop(sample_rate: u32) -> Result<(usize, usize)> {
    let window = (sample_rate as f64 * WINDOW_SECS).round() as usize;
    if window == 0 {
        return Err(AnalysisError::InvalidConfiguration(format!(
            "sample rate {} Hz is too low for a {} ms window",
            sample_rate,
            WINDOW_SECS * 1000.0
        )));
    }
    Ok((window, (window / 4).max(1)))
}

/// Compute the envelope of the first `duration` seconds of `stream`
pub fn extract_envelope(stream: &SampleStream, duration: f64) -> Result<Envelope> {
    if !(duration > 0.0) {
        return Err(AnalysisError::InvalidConfiguration(format!(
            "analysis duration must be positive, got {}",
            duration
        )));
    }

    let sample_rate = stream.sample_rate();
    let (window, hop) = window_and_hop(sample_rate)?;
    let samples = stream.head(duration);

    let points: Vec<EnvelopePoint> = (0..samples.len())
        .step_by(hop)
        .map(|start| {
            let end = (start + window).min(samples.len());
            EnvelopePoint {
                time: start as f64 / sample_rate as f64,
                amplitude: calculate_rms(&samples[start..end]),
            }
        })
        .collect();

    log::debug!(
        "Envelope: {} points from {} samples (window={}, hop={})",
        points.len(),
        samples.len(),
        window,
        hop
    );

    Ok(Envelope::from_points(points))
}

/// Root mean square of a chunk, accumulated in f64
#[inline]
fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_sq: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_sq / samples.len() as f64).sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn stream(samples: Vec<f32>, sample_rate: u32) -> SampleStream {
        SampleStream::new(samples, sample_rate).unwrap()
    }

    #[test]
    fn test_window_and_hop() {
        assert_eq!(window_and_hop(44100).unwrap(), (441, 110));
        assert_eq!(window_and_hop(8000).unwrap(), (80, 20));
        // 2 samples per window truncates the hop to 0, clamp to 1
        assert_eq!(window_and_hop(200).unwrap(), (2, 1));
        assert!(matches!(
            window_and_hop(40),
            Err(AnalysisError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_calculate_rms() {
        assert_eq!(calculate_rms(&[]), 0.0);
        assert!((calculate_rms(&[0.5, -0.5, 0.5, -0.5]) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_empty_stream_gives_empty_envelope() {
        let envelope = extract_envelope(&stream(Vec::new(), 44100), 10.0).unwrap();
        assert!(envelope.is_empty());
    }

    #[test]
    fn test_rejects_non_positive_duration() {
        let s = stream(vec![0.1; 100], 44100);
        assert!(extract_envelope(&s, 0.0).is_err());
        assert!(extract_envelope(&s, -1.0).is_err());
        assert!(extract_envelope(&s, f64::NAN).is_err());
    }

    #[test]
    fn test_short_stream_gives_single_point() {
        let envelope = extract_envelope(&stream(vec![0.5; 50], 44100), 10.0).unwrap();
        // Shorter than one hop: exactly one window
        assert_eq!(envelope.len(), 1);
        assert_eq!(envelope.points()[0].time, 0.0);
        assert!((envelope.points()[0].amplitude - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_silence_is_zero_everywhere() {
        let envelope = extract_envelope(&stream(vec![0.0; 4410], 44100), 10.0).unwrap();
        assert!(!envelope.is_empty());
        assert!(envelope.points().iter().all(|p| p.amplitude == 0.0));
    }

    #[test]
    fn test_timestamps_monotonic_and_bounded() {
        let samples: Vec<f32> = (0..12345)
            .map(|i| ((i * 7919) % 201) as f32 / 100.0 - 1.0)
            .collect();
        let s = stream(samples, 22050);
        let envelope = extract_envelope(&s, 10.0).unwrap();

        let points = envelope.points();
        assert_eq!(points[0].time, 0.0);
        assert!(points.windows(2).all(|w| w[0].time <= w[1].time));
        assert!(points.last().unwrap().time <= s.duration_secs());
        assert!(points.iter().all(|p| p.amplitude >= 0.0));
    }

    #[test]
    fn test_nonzero_window_has_positive_rms() {
        let mut samples = vec![0.0f32; 2000];
        samples[1000] = 0.25;
        let envelope = extract_envelope(&stream(samples, 44100), 10.0).unwrap();

        for point in envelope.points() {
            let start = (point.time * 44100.0).round() as usize;
            let covers_click = start <= 1000 && 1000 < start + 441;
            assert_eq!(point.amplitude > 0.0, covers_click, "at {}", point.time);
        }
    }

    #[test]
    fn test_duration_limits_coverage() {
        let envelope = extract_envelope(&stream(vec![0.2; 44100], 44100), 0.5).unwrap();
        let last = envelope.points().last().unwrap();
        assert!(last.time < 0.5);
        // 22050 samples stepped by 110
        assert_eq!(envelope.len(), 201);
    }

    #[test]
    fn test_one_second_sine() {
        // 4410 Hz at 44.1 kHz: exactly 10 samples per period
        let samples: Vec<f32> = (0..44100)
            .map(|n| 0.5 * (2.0 * PI * (n % 10) as f32 / 10.0).sin())
            .collect();
        let envelope = extract_envelope(&stream(samples, 44100), 1.0).unwrap();

        // Every start index 0, 110, ..., 44000 yields a point
        assert_eq!(envelope.len(), 401);

        let expected = 0.5 / 2f32.sqrt();
        for point in envelope.points() {
            assert!(
                (point.amplitude - expected).abs() < 1e-3,
                "rms {} at {}",
                point.amplitude,
                point.time
            );
        }
    }
}
