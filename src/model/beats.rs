use serde::{Deserialize, Serialize};

/// Onset timestamps in seconds, in the order the source reported them
///
/// Not guaranteed sorted or de-duplicated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeatSet {
    times: Vec<f64>,
}

impl BeatSet {
    pub fn new(times: Vec<f64>) -> Self {
        Self { times }
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Beats at or before `duration` seconds
    pub fn within(&self, duration: f64) -> Self {
        Self {
            times: self.times.iter().copied().filter(|&t| t <= duration).collect(),
        }
    }

    /// Copy sorted ascending
    pub fn sorted(&self) -> Self {
        let mut times = self.times.clone();
        times.sort_by(f64::total_cmp);
        Self { times }
    }
}

impl From<Vec<f64>> for BeatSet {
    fn from(times: Vec<f64>) -> Self {
        Self::new(times)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_keeps_boundary_beat() {
        let beats = BeatSet::new(vec![0.5, 10.0, 10.5, 3.0]);
        assert_eq!(beats.within(10.0).times(), &[0.5, 10.0, 3.0]);
    }

    #[test]
    fn test_sorted() {
        let beats = BeatSet::new(vec![2.0, 0.5, 1.0]);
        assert_eq!(beats.sorted().times(), &[0.5, 1.0, 2.0]);
        assert_eq!(beats.times(), &[2.0, 0.5, 1.0]);
    }
}
