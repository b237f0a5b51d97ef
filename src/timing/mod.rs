//! Persisted segment timing records
//!
//! The timing record is written by the video renderer; this crate only
//! reads it.

mod parser;

pub use parser::{parse_timing_data, parse_timing_file, TimingData, BEAT_SECTION_MARKER};
