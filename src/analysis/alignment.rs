//! Beat / segment-boundary alignment scoring
//!
//! Every beat is matched to the nearest segment start or end. A beat more
//! than the tolerance away from any boundary is misaligned; the tolerance
//! itself is inclusive.

use crate::error::{AnalysisError, Result};
use crate::model::{BeatSet, Gap, Timeline};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum allowed beat-to-boundary distance in seconds
pub const DEFAULT_TOLERANCE: f64 = 0.05;

/// Segment boundaries closer than this are treated as contiguous
pub const CONTINUITY_EPSILON: f64 = 0.001;

/// Absorbs rounding in `|beat - boundary|` so a beat exactly on the
/// tolerance stays aligned
const TOLERANCE_SLACK: f64 = 1e-9;

/// Which edge of a segment a boundary is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryKind {
    Start,
    End,
}

impl fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryKind::Start => write!(f, "start"),
            BoundaryKind::End => write!(f, "end"),
        }
    }
}

/// A segment start or end time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    /// Stored index of the owning segment
    pub segment_index: u32,
    pub kind: BoundaryKind,
    pub time: f64,
}

/// Nearest boundary and distance for one beat
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeatAlignment {
    pub beat: f64,
    pub nearest: Boundary,
    pub distance: f64,
}

impl BeatAlignment {
    /// True when the beat is farther than `tolerance` from its boundary
    ///
    /// A NaN distance never counts as within tolerance.
    pub fn exceeds(&self, tolerance: f64) -> bool {
        self.distance.is_nan() || self.distance > tolerance + TOLERANCE_SLACK
    }
}

/// Overall outcome of a scoring run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Verdict {
    Aligned,
    Misaligned {
        count: usize,
        /// Offending beats with their distances, in beat order
        offenders: Vec<BeatAlignment>,
    },
}

impl Verdict {
    pub fn is_aligned(&self) -> bool {
        matches!(self, Verdict::Aligned)
    }
}

/// Result of scoring a beat set against a timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentReport {
    pub tolerance: f64,
    /// One entry per input beat, in input order
    pub beats: Vec<BeatAlignment>,
    /// Diagnostic only; never affects the verdict
    pub gaps: Vec<Gap>,
    pub verdict: Verdict,
}

impl AlignmentReport {
    pub fn misaligned_count(&self) -> usize {
        match &self.verdict {
            Verdict::Aligned => 0,
            Verdict::Misaligned { count, .. } => *count,
        }
    }

    /// One-line human summary of the verdict
    pub fn summary(&self) -> String {
        let tolerance_ms = (self.tolerance * 1000.0).round();
        match &self.verdict {
            Verdict::Aligned => format!(
                "Alignment: Good (all beats within {}ms of segment boundaries)",
                tolerance_ms
            ),
            Verdict::Misaligned { count, .. } => {
                format!("Warning: {} beats misaligned >{}ms", count, tolerance_ms)
            }
        }
    }
}

/// Scores beats against segment boundaries
#[derive(Debug, Clone)]
pub struct AlignmentScorer {
    tolerance: f64,
}

impl AlignmentScorer {
    pub fn new() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Use a custom tolerance in seconds
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Score `beats` against the boundaries of `timeline`
    pub fn score(&self, timeline: &Timeline, beats: &BeatSet) -> Result<AlignmentReport> {
        if timeline.is_empty() {
            return Err(AnalysisError::InsufficientData(
                "timeline has no segments to align against".to_string(),
            ));
        }

        let boundaries = sorted_boundaries(timeline);

        let alignments = beats
            .times()
            .iter()
            .map(|&beat| -> Result<BeatAlignment> {
                let (nearest, distance) = nearest_boundary(&boundaries, beat).ok_or_else(|| {
                    AnalysisError::InsufficientData("no segment boundaries".to_string())
                })?;
                Ok(BeatAlignment {
                    beat,
                    nearest,
                    distance,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let offenders: Vec<BeatAlignment> = alignments
            .iter()
            .filter(|a| a.exceeds(self.tolerance))
            .copied()
            .collect();

        let verdict = if offenders.is_empty() {
            Verdict::Aligned
        } else {
            Verdict::Misaligned {
                count: offenders.len(),
                offenders,
            }
        };

        let gaps = timeline.gaps(CONTINUITY_EPSILON);
        if !gaps.is_empty() {
            log::debug!("Timeline has {} gap(s) between segments", gaps.len());
        }

        Ok(AlignmentReport {
            tolerance: self.tolerance,
            beats: alignments,
            gaps,
            verdict,
        })
    }
}

impl Default for AlignmentScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// All starts and ends, ascending by time
fn sorted_boundaries(timeline: &Timeline) -> Vec<Boundary> {
    let mut boundaries: Vec<Boundary> = timeline
        .segments()
        .iter()
        .flat_map(|s| {
            [
                Boundary {
                    segment_index: s.index,
                    kind: BoundaryKind::Start,
                    time: s.start_time,
                },
                Boundary {
                    segment_index: s.index,
                    kind: BoundaryKind::End,
                    time: s.end_time,
                },
            ]
        })
        .collect();
    boundaries.sort_by(|a, b| a.time.total_cmp(&b.time));
    boundaries
}

/// Binary search for the closest boundary in a time-sorted slice
fn nearest_boundary(boundaries: &[Boundary], beat: f64) -> Option<(Boundary, f64)> {
    let idx = boundaries.partition_point(|b| b.time < beat);

    // Only the neighbours on either side of the insertion point can be closest
    [idx.checked_sub(1), Some(idx)]
        .into_iter()
        .flatten()
        .filter_map(|i| boundaries.get(i))
        .map(|b| (*b, (beat - b.time).abs()))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}
