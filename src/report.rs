//! Plain-text report writers
//!
//! These produce the data behind the envelope and alignment views as text,
//! so any plotting tool can pick them up.

use crate::analysis::{AlignmentReport, Verdict};
use crate::model::{BeatSet, Envelope, Timeline};
use std::io::{self, Write};

/// Number of beats labelled with their timestamp in the envelope header
const LABELLED_BEATS: usize = 10;

/// Write the envelope as `time<TAB>rms` rows preceded by a beat header
pub fn write_envelope<W: Write>(
    out: &mut W,
    envelope: &Envelope,
    beats: &BeatSet,
    duration: f64,
) -> io::Result<()> {
    writeln!(out, "# Audio envelope with beat detections (first {}s)", duration)?;
    writeln!(out, "# {} beats", beats.len())?;

    let labels: Vec<String> = beats
        .sorted()
        .times()
        .iter()
        .take(LABELLED_BEATS)
        .map(|b| format!("{:.3}s", b))
        .collect();
    if !labels.is_empty() {
        writeln!(out, "# beats: {}", labels.join(" "))?;
    }

    writeln!(out, "time\trms")?;
    for point in envelope.points() {
        writeln!(out, "{:.6}\t{:.6}", point.time, point.amplitude)?;
    }

    writeln!(out)?;
    writeln!(out, "# Beat times")?;
    for beat in beats.times() {
        writeln!(out, "{:.6}", beat)?;
    }
    Ok(())
}

/// Write a per-beat alignment table, the gap list and the verdict
pub fn write_alignment<W: Write>(
    out: &mut W,
    timeline: &Timeline,
    report: &AlignmentReport,
) -> io::Result<()> {
    writeln!(out, "# Chip image timing vs beat times")?;
    if let Some((min, max)) = timeline.chip_range() {
        writeln!(
            out,
            "# {} segments, chips {}..={}, {} beats",
            timeline.len(),
            min,
            max,
            report.beats.len()
        )?;
    }
    writeln!(out, "{}", report.summary())?;
    writeln!(out)?;

    writeln!(out, "beat\tsegment\tboundary\tboundary_time\tdistance\tstatus")?;
    for a in &report.beats {
        let status = if a.exceeds(report.tolerance) {
            "MISALIGNED"
        } else {
            "ok"
        };
        writeln!(
            out,
            "{:.3}\t{}\t{}\t{:.3}\t{:.3}\t{}",
            a.beat, a.nearest.segment_index, a.nearest.kind, a.nearest.time, a.distance, status
        )?;
    }

    if !report.gaps.is_empty() {
        writeln!(out)?;
        writeln!(out, "# Gaps between segments (start-time order)")?;
        for gap in &report.gaps {
            writeln!(
                out,
                "{} -> {}: {:.3}s .. {:.3}s ({:+.3}s)",
                gap.after_index,
                gap.before_index,
                gap.from,
                gap.to,
                gap.size()
            )?;
        }
    }

    if let Verdict::Misaligned { offenders, .. } = &report.verdict {
        writeln!(out)?;
        writeln!(out, "# Misaligned beats")?;
        for a in offenders {
            writeln!(
                out,
                "{:.3}s is {:.0}ms from nearest boundary",
                a.beat,
                a.distance * 1000.0
            )?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AlignmentScorer;
    use crate::model::{SampleStream, Segment};

    #[test]
    fn test_write_envelope() {
        let stream = SampleStream::new(vec![0.5; 200], 1000).unwrap();
        let envelope = crate::analysis::extract_envelope(&stream, 1.0).unwrap();
        let beats = BeatSet::new(vec![0.05, 0.15]);

        let mut out = Vec::new();
        write_envelope(&mut out, &envelope, &beats, 1.0).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("# beats: 0.050s 0.150s"));
        assert!(text.contains("0.000000\t0.500000"));
        // window=10, hop=2 -> 100 rows
        let rows = text.lines().filter(|l| l.contains('\t')).count();
        assert_eq!(rows, 1 + 100);
    }

    #[test]
    fn test_write_alignment() {
        let timeline = Timeline::new(vec![
            Segment::new(0, 1, 0.0, 1.0),
            Segment::new(1, 2, 1.0, 2.0),
            Segment::new(2, 3, 2.5, 3.0),
        ]);
        let beats = BeatSet::new(vec![0.0, 1.02, 2.25]);
        let report = AlignmentScorer::new().score(&timeline, &beats).unwrap();

        let mut out = Vec::new();
        write_alignment(&mut out, &timeline, &report).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Warning: 1 beats misaligned >50ms"));
        assert!(text.contains("# 3 segments, chips 1..=3, 3 beats"));
        assert!(text.contains("2.250s is 250ms from nearest boundary"));
        assert!(text.contains("1 -> 2: 2.000s .. 2.500s (+0.500s)"));
    }

    #[test]
    fn test_beat_on_tolerance_edge_is_ok() {
        let timeline = Timeline::new(vec![
            Segment::new(0, 1, 0.0, 1.0),
            Segment::new(1, 2, 1.0, 2.0),
        ]);
        let report = AlignmentScorer::new()
            .score(&timeline, &BeatSet::new(vec![1.05]))
            .unwrap();

        let mut out = Vec::new();
        write_alignment(&mut out, &timeline, &report).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Alignment: Good"));
        assert!(text.contains("1.050\t1\tstart\t1.000\t0.050\tok"));
        assert!(!text.contains("MISALIGNED"));
    }
}
