//! Numeric analysis core
//!
//! Two independent computations: the RMS envelope of a sample stream, and
//! the alignment of onset times against segment boundaries. External tools
//! are reached only through the `AudioDecoder` and `OnsetDetector` traits.

mod alignment;
mod envelope;
mod traits;

pub use alignment::{
    AlignmentReport, AlignmentScorer, BeatAlignment, Boundary, BoundaryKind, Verdict,
    CONTINUITY_EPSILON, DEFAULT_TOLERANCE,
};
pub use envelope::{extract_envelope, window_and_hop, WINDOW_SECS};
pub use traits::{AudioDecoder, OnsetDetector};
