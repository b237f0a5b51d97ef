//! Timing record parser
//!
//! Segment lines are pipe-delimited:
//! `segment_index|chip_num|chip_year|start_time|end_time|duration|frame_count`.
//! Only the index, chip number, start and end are read. A line containing
//! "Beat times" starts the beat section, one timestamp per line.

use crate::error::{AnalysisError, Result};
use crate::model::{BeatSet, Segment, Timeline};
use anyhow::Context;
use std::path::Path;

/// Marker that switches the parser into the beat section
pub const BEAT_SECTION_MARKER: &str = "Beat times";

/// Everything recovered from a timing record
#[derive(Debug, Clone, Default)]
pub struct TimingData {
    pub timeline: Timeline,
    pub beats: BeatSet,
    /// Lines that were dropped, as `MalformedRecord` errors
    pub skipped: Vec<AnalysisError>,
}

/// Read and parse a timing record from disk
pub fn parse_timing_file(path: &Path) -> anyhow::Result<TimingData> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read timing data: {:?}", path))?;
    let data = parse_timing_data(&content);

    log::info!(
        "Loaded {} segments and {} beats from {:?}",
        data.timeline.len(),
        data.beats.len(),
        path
    );
    if !data.skipped.is_empty() {
        log::warn!("Skipped {} malformed line(s) in {:?}", data.skipped.len(), path);
    }

    Ok(data)
}

/// Parse timing record text; malformed lines are logged and skipped
pub fn parse_timing_data(content: &str) -> TimingData {
    let mut segments = Vec::new();
    let mut beats = Vec::new();
    let mut skipped = Vec::new();
    let mut in_beats = false;

    for (i, raw) in content.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim();

        if line.contains(BEAT_SECTION_MARKER) {
            in_beats = true;
            continue;
        }
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parsed = if in_beats {
            parse_beat_line(line_no, line).map(|beat| beats.push(beat))
        } else {
            parse_segment_line(line_no, line).map(|segment| segments.push(segment))
        };

        if let Err(e) = parsed {
            log::warn!("{}", e);
            skipped.push(e);
        }
    }

    TimingData {
        timeline: Timeline::new(segments),
        beats: BeatSet::new(beats),
        skipped,
    }
}

fn parse_beat_line(line_no: usize, line: &str) -> Result<f64> {
    let beat: f64 = line
        .parse()
        .map_err(|_| AnalysisError::malformed(line_no, line, "beat time is not a number"))?;

    if !beat.is_finite() || beat < 0.0 {
        return Err(AnalysisError::malformed(
            line_no,
            line,
            "beat time must be a non-negative number",
        ));
    }
    Ok(beat)
}

fn parse_segment_line(line_no: usize, line: &str) -> Result<Segment> {
    let parts: Vec<&str> = line.split('|').map(str::trim).collect();
    if parts.len() < 5 {
        return Err(AnalysisError::malformed(
            line_no,
            line,
            format!("expected at least 5 '|' fields, found {}", parts.len()),
        ));
    }

    let bad = |field: &str| AnalysisError::malformed(line_no, line, format!("invalid {}", field));

    let index: u32 = parts[0].parse().map_err(|_| bad("segment index"))?;
    let chip_id: i64 = parts[1].parse().map_err(|_| bad("chip number"))?;
    let start_time: f64 = parts[3].parse().map_err(|_| bad("start time"))?;
    let end_time: f64 = parts[4].parse().map_err(|_| bad("end time"))?;

    if !start_time.is_finite() || !end_time.is_finite() || start_time < 0.0 {
        return Err(AnalysisError::malformed(
            line_no,
            line,
            "segment times must be finite and non-negative",
        ));
    }
    if end_time < start_time {
        return Err(AnalysisError::malformed(
            line_no,
            line,
            "segment ends before it starts",
        ));
    }

    Ok(Segment::new(index, chip_id, start_time, end_time))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# segment_index|chip_num|chip_year|start_time|end_time|duration|frame_count
0|4004|1971|0.000|1.000|1.000|30
1|8008|1972|1.000|2.000|1.000|30

2|8080|1974|2.000|3.000|1.000|30
# Beat times (seconds)
0.0
1.02
2.5
";

    #[test]
    fn test_parse_sections() {
        let data = parse_timing_data(SAMPLE);
        assert!(data.skipped.is_empty());

        let segments = data.timeline.segments();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1], Segment::new(1, 8008, 1.0, 2.0));
        assert_eq!(data.beats.times(), &[0.0, 1.02, 2.5]);
    }

    #[test]
    fn test_malformed_segment_lines_are_skipped() {
        let content = "\
0|1|1971|0.0|1.0|1.0|30
oops|1|1971|1.0|2.0|1.0|30
2|1|1971|2.0
3|1|1971|3.0|2.5|0|0
4|1|1971|-1.0|2.0|3|0
5|2|1971|3.0|4.0
";
        let data = parse_timing_data(content);

        let indices: Vec<u32> = data.timeline.segments().iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 5]);
        assert_eq!(data.skipped.len(), 4);
        assert!(data
            .skipped
            .iter()
            .all(|e| matches!(e, AnalysisError::MalformedRecord { .. })));
        assert!(matches!(
            &data.skipped[0],
            AnalysisError::MalformedRecord { line: 2, .. }
        ));
    }

    #[test]
    fn test_beat_section_skips_bad_lines() {
        let content = "\
0|1|1971|0.0|1.0|1.0|30
Beat times:
0.25
not-a-beat
# comment
-3.0

1.75
";
        let data = parse_timing_data(content);
        assert_eq!(data.beats.times(), &[0.25, 1.75]);
        assert_eq!(data.skipped.len(), 2);
        assert_eq!(data.timeline.len(), 1);
    }

    #[test]
    fn test_no_beat_section() {
        let data = parse_timing_data("0|1|1971|0.0|1.0\n");
        assert_eq!(data.timeline.len(), 1);
        assert!(data.beats.is_empty());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(parse_timing_file(Path::new("/nonexistent/timing_data.txt")).is_err());
    }
}
