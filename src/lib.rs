//! Beat Align - audio envelope and beat/segment alignment checks
//!
//! This library computes a coarse RMS loudness curve for an audio excerpt
//! and verifies that detected onsets line up with the boundaries of a
//! previously rendered image sequence.

pub mod analysis;
pub mod config;
pub mod error;
pub mod external;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod timing;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};
pub use pipeline::BeatAnalysis;
