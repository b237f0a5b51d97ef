//! Orchestration of the envelope and alignment views

use crate::analysis::{
    extract_envelope, AlignmentReport, AlignmentScorer, AudioDecoder, OnsetDetector,
};
use crate::config::AnalysisConfig;
use crate::model::{BeatSet, Envelope};
use crate::timing::{parse_timing_file, TimingData};
use anyhow::{Context, Result};
use std::path::Path;

/// Envelope plus the beats that fall inside the analysed duration
#[derive(Debug, Clone)]
pub struct EnvelopeView {
    pub envelope: Envelope,
    pub beats: BeatSet,
    pub duration: f64,
}

/// Parsed timing record and its alignment score
#[derive(Debug, Clone)]
pub struct AlignmentView {
    pub timing: TimingData,
    /// The beats that were scored (from the record or re-detected)
    pub beats: BeatSet,
    pub report: AlignmentReport,
}

/// Runs decoding, onset detection and scoring with a given set of tools
pub struct BeatAnalysis<D: AudioDecoder, O: OnsetDetector> {
    config: AnalysisConfig,
    decoder: D,
    detector: O,
}

impl<D: AudioDecoder, O: OnsetDetector> BeatAnalysis<D, O> {
    pub fn new(config: AnalysisConfig, decoder: D, detector: O) -> Self {
        Self {
            config,
            decoder,
            detector,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Detect onsets for an audio file with the configured threshold and method
    pub fn detect_beats(&self, audio_path: &Path) -> Result<BeatSet> {
        log::info!("Extracting beats from {:?}...", audio_path);
        let beats = self
            .detector
            .detect(audio_path, self.config.sensitivity, self.config.method)
            .with_context(|| format!("Onset detection failed for {:?}", audio_path))?;
        Ok(beats)
    }

    /// Envelope of the first `duration` seconds with the beats inside it
    pub fn envelope_view(&self, audio_path: &Path) -> Result<EnvelopeView> {
        ensure_exists(audio_path, "Audio file")?;
        let duration = self.config.duration;

        let beats = self.detect_beats(audio_path)?.within(duration);
        log::info!("Found {} beats in first {}s", beats.len(), duration);

        log::info!("Loading audio envelope for first {}s...", duration);
        let stream = self
            .decoder
            .decode(audio_path, duration)
            .with_context(|| format!("Failed to decode {:?}", audio_path))?;

        let envelope = extract_envelope(&stream, duration)?;
        if let Some(peak) = envelope.peak() {
            log::debug!(
                "Envelope has {} points, peak RMS {:.4} at {:.3}s",
                envelope.len(),
                peak.amplitude,
                peak.time
            );
        }

        Ok(EnvelopeView {
            envelope,
            beats,
            duration,
        })
    }

    /// Score a timing record's segments against beats
    ///
    /// Beats come from the record's beat section unless `audio_path` is
    /// given, in which case they are re-detected from that audio.
    pub fn alignment_view(
        &self,
        timing_path: &Path,
        audio_path: Option<&Path>,
    ) -> Result<AlignmentView> {
        ensure_exists(timing_path, "Timing data file")?;
        let timing = parse_timing_file(timing_path)?;

        let beats = match audio_path {
            Some(audio) => {
                ensure_exists(audio, "Audio file")?;
                self.detect_beats(audio)?
            }
            None => timing.beats.clone(),
        };
        if beats.is_empty() {
            log::warn!("No beats found for {:?}", timing_path);
        }

        let report = AlignmentScorer::new()
            .with_tolerance(self.config.tolerance)
            .score(&timing.timeline, &beats)
            .with_context(|| format!("Cannot score alignment for {:?}", timing_path))?;

        if report.verdict.is_aligned() {
            log::info!("{}", report.summary());
        } else {
            log::warn!("{}", report.summary());
        }

        Ok(AlignmentView {
            timing,
            beats,
            report,
        })
    }
}

fn ensure_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("{} not found: {:?}", what, path);
    }
    Ok(())
}
