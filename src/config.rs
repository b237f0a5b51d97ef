//! Analysis configuration

use crate::analysis::DEFAULT_TOLERANCE;
use crate::external::{OnsetMethod, DEFAULT_SENSITIVITY};
use std::path::{Path, PathBuf};

/// Default length of audio analysed by the envelope view, in seconds
pub const DEFAULT_DURATION: f64 = 10.0;

/// Configuration shared by the envelope and alignment views
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Seconds of audio to decode and plot beats for
    pub duration: f64,

    /// Onset detection threshold
    pub sensitivity: f32,

    /// Onset detection function
    pub method: OnsetMethod,

    /// Allowed beat-to-boundary distance in seconds
    pub tolerance: f64,

    /// Where to write the report (None = view-specific default)
    pub output: Option<PathBuf>,
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            sensitivity: DEFAULT_SENSITIVITY,
            method: OnsetMethod::Default,
            tolerance: DEFAULT_TOLERANCE,
            output: None,
        }
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Set onset threshold and method together
    pub fn with_detection(mut self, sensitivity: f32, method: OnsetMethod) -> Self {
        self.sensitivity = sensitivity;
        self.method = method;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_output(mut self, output: PathBuf) -> Self {
        self.output = Some(output);
        self
    }

    /// Report path for a timing file: explicit output, else `<stem>_alignment.txt`
    pub fn alignment_output(&self, timing_path: &Path) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| derive_alignment_path(timing_path))
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// `foo_timing_data.txt` -> `foo_timing_data_alignment.txt`
pub fn derive_alignment_path(timing_path: &Path) -> PathBuf {
    let name = timing_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let derived = match name.strip_suffix(".txt") {
        Some(stem) => format!("{}_alignment.txt", stem),
        None => format!("{}_alignment.txt", name),
    };
    timing_path.with_file_name(derived)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.duration, 10.0);
        assert_eq!(config.sensitivity, 0.3);
        assert_eq!(config.method, OnsetMethod::Default);
        assert_eq!(config.tolerance, 0.05);
        assert!(config.output.is_none());
    }

    #[test]
    fn test_derive_alignment_path() {
        assert_eq!(
            derive_alignment_path(Path::new("/videos/clip_timing_data.txt")),
            PathBuf::from("/videos/clip_timing_data_alignment.txt")
        );
        assert_eq!(
            derive_alignment_path(Path::new("timing.log")),
            PathBuf::from("timing.log_alignment.txt")
        );
    }

    #[test]
    fn test_explicit_output_wins() {
        let config = AnalysisConfig::new().with_output(PathBuf::from("/tmp/report.txt"));
        assert_eq!(
            config.alignment_output(Path::new("clip_timing_data.txt")),
            PathBuf::from("/tmp/report.txt")
        );
    }
}
