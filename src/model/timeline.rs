use serde::{Deserialize, Serialize};

/// One visual segment (a chip image held on screen for a time span)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Identity from the timing record; not an iteration order
    pub index: u32,

    /// Chip number shown during this segment
    pub chip_id: i64,

    /// Start time in seconds
    pub start_time: f64,

    /// End time in seconds (>= start_time)
    pub end_time: f64,
}

impl Segment {
    pub fn new(index: u32, chip_id: i64, start_time: f64, end_time: f64) -> Self {
        Self {
            index,
            chip_id,
            start_time,
            end_time,
        }
    }
}

/// A discontinuity between two segments adjacent in start-time order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    /// Index of the segment before the gap
    pub after_index: u32,

    /// Index of the segment after the gap
    pub before_index: u32,

    /// End of the earlier segment
    pub from: f64,

    /// Start of the later segment
    pub to: f64,
}

impl Gap {
    /// Signed size: positive for a hole, negative for an overlap
    pub fn size(&self) -> f64 {
        self.to - self.from
    }
}

/// Segments in the order they were recorded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    segments: Vec<Segment>,
}

impl Timeline {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments sorted by start time (stable for equal starts)
    pub fn by_start_time(&self) -> Vec<Segment> {
        let mut sorted = self.segments.clone();
        sorted.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        sorted
    }

    /// Discontinuities larger than `epsilon` between consecutive segments
    ///
    /// Segments are visited in start-time order; the stored index is only
    /// used to name the neighbours.
    pub fn gaps(&self, epsilon: f64) -> Vec<Gap> {
        self.by_start_time()
            .windows(2)
            .filter(|pair| (pair[0].end_time - pair[1].start_time).abs() > epsilon)
            .map(|pair| Gap {
                after_index: pair[0].index,
                before_index: pair[1].index,
                from: pair[0].end_time,
                to: pair[1].start_time,
            })
            .collect()
    }

    /// Smallest and largest chip id, for laying out a chip axis
    pub fn chip_range(&self) -> Option<(i64, i64)> {
        let min = self.segments.iter().map(|s| s.chip_id).min()?;
        let max = self.segments.iter().map(|s| s.chip_id).max()?;
        Some((min, max))
    }
}
