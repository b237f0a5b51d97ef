//! In-process audio decoding with symphonia

use crate::analysis::AudioDecoder;
use crate::error::{AnalysisError, Result};
use crate::model::SampleStream;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

const TOOL: &str = "symphonia";

/// Decodes with symphonia at the file's native sample rate, downmixed to mono
#[derive(Debug, Clone, Default)]
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, audio_path: &Path, duration: f64) -> Result<SampleStream> {
        log::debug!("Decoding {:?} with symphonia ({:.1}s)", audio_path, duration);

        let (samples, sample_rate) = decode_to_mono(audio_path, duration)?;

        log::debug!(
            "Decoded {} samples ({:.1}s) at {}Hz",
            samples.len(),
            samples.len() as f32 / sample_rate as f32,
            sample_rate
        );

        SampleStream::new(samples, sample_rate)
    }
}

/// Decode the first `duration` seconds of a file to mono f32 samples
fn decode_to_mono(path: &Path, duration: f64) -> Result<(Vec<f32>, u32)> {
    let file = std::fs::File::open(path).map_err(|e| AnalysisError::decode(path, TOOL, e))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension() {
        hint.with_extension(ext.to_str().unwrap_or(""));
    }

    let format_opts = FormatOptions::default();
    let metadata_opts = MetadataOptions::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &metadata_opts)
        .map_err(|e| AnalysisError::decode(path, TOOL, format!("failed to probe format: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| AnalysisError::decode(path, TOOL, "no audio track found"))?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AnalysisError::decode(path, TOOL, "no sample rate in audio track"))?;

    let dec_opts = DecoderOptions::default();
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &dec_opts)
        .map_err(|e| AnalysisError::decode(path, TOOL, format!("no decoder: {}", e)))?;

    let max_samples = (duration * sample_rate as f64).round() as usize;
    let mut all_samples: Vec<f32> = Vec::with_capacity(max_samples);

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                end_of_readable_packets(path, all_samples.len(), sample_rate, e)?;
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("Error decoding packet: {:?}", e);
                continue;
            }
        };

        let spec = *decoded.spec();
        let capacity = decoded.capacity() as u64;

        let mut sample_buf = SampleBuffer::<f32>::new(capacity, spec);
        sample_buf.copy_interleaved_ref(decoded);

        let samples = sample_buf.samples();

        // Convert to mono if stereo
        let channels = spec.channels.count();
        if channels > 1 {
            for chunk in samples.chunks(channels) {
                let mono: f32 = chunk.iter().sum::<f32>() / channels as f32;
                all_samples.push(mono);
            }
        } else {
            all_samples.extend_from_slice(samples);
        }

        if all_samples.len() >= max_samples {
            break;
        }
    }

    all_samples.truncate(max_samples);
    Ok((all_samples, sample_rate))
}

/// A packet read failed before EOF: fatal if nothing was decoded yet,
/// otherwise keep what we have and say how much that is
fn end_of_readable_packets(
    path: &Path,
    decoded: usize,
    sample_rate: u32,
    err: symphonia::core::errors::Error,
) -> Result<()> {
    if decoded == 0 {
        return Err(AnalysisError::decode(
            path,
            TOOL,
            format!("failed to read first packet: {}", err),
        ));
    }
    log::warn!(
        "Error reading packet in {:?} after {} samples ({:.2}s), stream truncated: {}",
        path,
        decoded,
        decoded as f64 / sample_rate as f64,
        err
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use hound::{SampleFormat, WavSpec, WavWriter};
    use symphonia::core::errors::Error as SymphoniaError;

    /// 16-bit PCM WAV fixture
    fn write_wav(path: &Path, sample_rate: u32, channels: u16, samples: &[i16]) {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut writer = WavWriter::create(path, spec).unwrap();
        for &sample in samples {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_decode_truncates_to_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_wav(&path, 8000, 1, &vec![16384; 16000]);

        let stream = SymphoniaDecoder::new().decode(&path, 1.0).unwrap();
        assert_eq!(stream.sample_rate(), 8000);
        assert_eq!(stream.len(), 8000);
        assert!(stream.samples().iter().all(|&s| (s - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_decode_downmixes_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let frames: Vec<i16> = (0..4000).flat_map(|_| [16384i16, 0]).collect();
        write_wav(&path, 8000, 2, &frames);

        let stream = SymphoniaDecoder::new().decode(&path, 10.0).unwrap();
        assert_eq!(stream.len(), 4000);
        assert!(stream.samples().iter().all(|&s| (s - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_read_error_before_any_audio_is_decode_error() {
        let result = end_of_readable_packets(
            Path::new("broken.m4a"),
            0,
            44100,
            SymphoniaError::DecodeError("corrupt packet"),
        );
        match result {
            Err(AnalysisError::Decode { tool, message, .. }) => {
                assert_eq!(tool, "symphonia");
                assert!(message.contains("corrupt packet"));
            }
            other => panic!("expected a decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_error_after_audio_keeps_partial_stream() {
        let result = end_of_readable_packets(
            Path::new("broken.m4a"),
            22050,
            44100,
            SymphoniaError::DecodeError("corrupt packet"),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_decode_requires_file() {
        let result = SymphoniaDecoder::new().decode(Path::new("/nonexistent/file.m4a"), 10.0);
        assert!(matches!(result, Err(AnalysisError::Decode { .. })));
    }

    #[test]
    fn test_decode_rejects_non_audio() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.wav");
        std::fs::write(&path, b"definitely not a RIFF header").unwrap();

        let result = SymphoniaDecoder::new().decode(&path, 10.0);
        assert!(matches!(result, Err(AnalysisError::Decode { tool: "symphonia", .. })));
    }
}
