//! Decoding through the ffmpeg command-line tool
//!
//! ffmpeg resamples to a fixed rate, downmixes to mono and writes raw
//! little-endian 16-bit PCM to stdout.

use crate::analysis::AudioDecoder;
use crate::error::{AnalysisError, Result};
use crate::model::SampleStream;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const TOOL: &str = "ffmpeg";

/// Sample rate ffmpeg is asked to produce
pub const FFMPEG_SAMPLE_RATE: u32 = 44100;

/// Runs `ffmpeg` to produce a 44.1 kHz mono stream
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    executable: PathBuf,
    sample_rate: u32,
}

impl FfmpegDecoder {
    pub fn new() -> Self {
        Self {
            executable: PathBuf::from("ffmpeg"),
            sample_rate: FFMPEG_SAMPLE_RATE,
        }
    }

    /// Use a specific ffmpeg binary instead of the one on PATH
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    fn command(&self, audio_path: &Path, duration: f64) -> Command {
        let rate = self.sample_rate.to_string();
        let mut cmd = Command::new(&self.executable);
        cmd.args(["-nostdin", "-loglevel", "error", "-i"])
            .arg(audio_path)
            .arg("-t")
            .arg(duration.to_string())
            .args(["-ar", rate.as_str(), "-ac", "1"])
            .args(["-f", "s16le", "-acodec", "pcm_s16le", "-"]);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioDecoder for FfmpegDecoder {
    fn decode(&self, audio_path: &Path, duration: f64) -> Result<SampleStream> {
        log::debug!("Decoding {:?} with {:?}", audio_path, self.executable);

        let output = self
            .command(audio_path, duration)
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => AnalysisError::decode(
                    audio_path,
                    TOOL,
                    format!("{:?} not found on PATH", self.executable),
                ),
                _ => AnalysisError::decode(audio_path, TOOL, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AnalysisError::decode(
                audio_path,
                TOOL,
                format!("exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        let samples = pcm_s16le_to_i16(&output.stdout);
        SampleStream::from_i16(&samples, 1, self.sample_rate)
    }
}

/// Reinterpret raw little-endian 16-bit PCM; a trailing odd byte is dropped
fn pcm_s16le_to_i16(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm_s16le_to_i16() {
        let bytes = [0x00, 0x80, 0x00, 0x40, 0xff, 0x7f, 0x01];
        assert_eq!(pcm_s16le_to_i16(&bytes), vec![-32768, 16384, 32767]);
    }

    #[test]
    fn test_command_line() {
        let cmd = FfmpegDecoder::new().command(Path::new("song.m4a"), 10.0);
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(cmd.get_program(), "ffmpeg");
        assert!(args.windows(2).any(|w| w == ["-t", "10"]));
        assert!(args.windows(2).any(|w| w == ["-ar", "44100"]));
        assert!(args.windows(2).any(|w| w == ["-ac", "1"]));
        assert_eq!(args.last().map(String::as_str), Some("-"));
    }

    #[test]
    fn test_missing_executable_is_decode_error() {
        let decoder = FfmpegDecoder::new().with_executable("/nonexistent/bin/ffmpeg");
        let result = decoder.decode(Path::new("song.m4a"), 10.0);
        assert!(matches!(result, Err(AnalysisError::Decode { tool: "ffmpeg", .. })));
    }
}
