//! Error taxonomy for the analysis core and its collaborators

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by decoding, onset detection, parsing and scoring
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    /// Audio could not be converted or read
    #[error("{tool} could not decode {path:?}: {message}")]
    Decode {
        path: PathBuf,
        tool: &'static str,
        message: String,
    },

    /// Onset detection tool missing or failed
    #[error("{tool} failed on {path:?}: {message}")]
    Detection {
        path: PathBuf,
        tool: &'static str,
        message: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// A line of a timing record did not have the expected shape
    #[error("malformed record at line {line} ({reason}): {content:?}")]
    MalformedRecord {
        line: usize,
        content: String,
        reason: String,
    },
}

impl AnalysisError {
    pub(crate) fn decode(
        path: &std::path::Path,
        tool: &'static str,
        err: impl std::fmt::Display,
    ) -> Self {
        Self::Decode {
            path: path.to_path_buf(),
            tool,
            message: err.to_string(),
        }
    }

    pub(crate) fn detection(
        path: &std::path::Path,
        tool: &'static str,
        err: impl std::fmt::Display,
    ) -> Self {
        Self::Detection {
            path: path.to_path_buf(),
            tool,
            message: err.to_string(),
        }
    }

    pub(crate) fn malformed(line: usize, content: &str, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            content: content.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for the analysis core
pub type Result<T> = std::result::Result<T, AnalysisError>;
