//! Onset detection through the `aubioonset` command-line tool

use crate::analysis::OnsetDetector;
use crate::error::{AnalysisError, Result};
use crate::model::BeatSet;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;

const TOOL: &str = "aubioonset";

/// Default peak-picking threshold passed to aubioonset
pub const DEFAULT_SENSITIVITY: f32 = 0.3;

/// Onset detection function understood by aubioonset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
pub enum OnsetMethod {
    #[default]
    Default,
    Energy,
    /// High frequency content
    Hfc,
    /// Complex domain
    Complex,
    /// Phase based
    Phase,
    /// Spectral difference
    Specdiff,
    /// Kullback-Leibler
    Kl,
    /// Modified Kullback-Leibler
    Mkl,
    /// Spectral flux
    Specflux,
}

impl OnsetMethod {
    /// Name as passed to `aubioonset -O`
    pub fn name(&self) -> &'static str {
        match self {
            OnsetMethod::Default => "default",
            OnsetMethod::Energy => "energy",
            OnsetMethod::Hfc => "hfc",
            OnsetMethod::Complex => "complex",
            OnsetMethod::Phase => "phase",
            OnsetMethod::Specdiff => "specdiff",
            OnsetMethod::Kl => "kl",
            OnsetMethod::Mkl => "mkl",
            OnsetMethod::Specflux => "specflux",
        }
    }
}

impl fmt::Display for OnsetMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OnsetMethod {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        OnsetMethod::value_variants()
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                AnalysisError::InvalidConfiguration(format!("unknown onset method: {}", s))
            })
    }
}

/// Runs `aubioonset -i <file> -t <threshold> -O <method>`
#[derive(Debug, Clone)]
pub struct AubioOnsetDetector {
    executable: PathBuf,
}

impl AubioOnsetDetector {
    pub fn new() -> Self {
        Self {
            executable: PathBuf::from(TOOL),
        }
    }

    /// Use a specific aubioonset binary instead of the one on PATH
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    fn command(&self, audio_path: &Path, sensitivity: f32, method: OnsetMethod) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.arg("-i")
            .arg(audio_path)
            .arg("-t")
            .arg(sensitivity.to_string())
            .arg("-O")
            .arg(method.name());
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }
}

impl Default for AubioOnsetDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl OnsetDetector for AubioOnsetDetector {
    fn detect(&self, audio_path: &Path, sensitivity: f32, method: OnsetMethod) -> Result<BeatSet> {
        log::debug!(
            "Running {:?} on {:?} (threshold={}, method={})",
            self.executable,
            audio_path,
            sensitivity,
            method
        );

        let output = self
            .command(audio_path, sensitivity, method)
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => AnalysisError::detection(
                    audio_path,
                    TOOL,
                    format!("{:?} not found on PATH", self.executable),
                ),
                _ => AnalysisError::detection(audio_path, TOOL, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AnalysisError::detection(
                audio_path,
                TOOL,
                format!("exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        let beats = parse_onset_output(&String::from_utf8_lossy(&output.stdout));
        log::debug!("{} onsets detected in {:?}", beats.len(), audio_path);
        Ok(beats)
    }
}

/// One timestamp per line; blank, non-numeric and negative or non-finite
/// lines are skipped
pub fn parse_onset_output(stdout: &str) -> BeatSet {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match line.parse::<f64>() {
            Ok(t) if t.is_finite() && t >= 0.0 => Some(t),
            Ok(_) => {
                log::warn!("Ignoring out-of-range onset time from {}: {}", TOOL, line);
                None
            }
            Err(_) => None,
        })
        .collect::<Vec<_>>()
        .into()
}
