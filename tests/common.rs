/// Synthetic session builders shared by the integration tests.
use ndarray::{s, Array2};

/// Sample clock period used by [`SessionBuilder`].
pub const TICK: i64 = 10;

/// Builds a session on a clock of `i * TICK + offset` with trials drawn as
/// constant plateaus on the chosen channels.
pub struct SessionBuilder {
    pub kinematics: Array2<f32>,
    pub starts: Vec<i64>,
    pub stops: Vec<i64>,
    offset: i64,
}

#[allow(unused)]
impl SessionBuilder {
    pub fn new(n_samples: usize, n_dofs: usize) -> Self {
        Self {
            kinematics: Array2::zeros((n_samples, n_dofs)),
            starts: vec![],
            stops: vec![],
            offset: 1_000_000,
        }
    }

    /// Clock time of sample `idx`.
    pub fn time_of(&self, idx: usize) -> i64 {
        idx as i64 * TICK + self.offset
    }

    pub fn timestamps(&self) -> Vec<i64> {
        (0..self.kinematics.nrows()).map(|i| self.time_of(i)).collect()
    }

    /// Add a trial over samples `[start, stop)` with `value` on each listed channel.
    pub fn trial(mut self, start: usize, stop: usize, channels: &[(usize, f32)]) -> Self {
        for &(ch, value) in channels {
            self.kinematics.slice_mut(s![start..stop, ch]).fill(value);
        }
        self.starts.push(self.time_of(start));
        self.stops.push(self.time_of(stop));
        self
    }

    /// `n` trials of the same gesture, 10 samples long, 50 samples apart,
    /// starting at `first`.
    pub fn repeat(mut self, first: usize, n: usize, channels: &[(usize, f32)]) -> Self {
        for i in 0..n {
            let start = first + i * 50;
            self = self.trial(start, start + 10, channels);
        }
        self
    }
}

#[allow(unused)]
/// Assert the stitched coordinates of `infos` tile `[0, total)` and
/// preserve trial lengths.
pub fn assert_tiles(infos: &[kinsplit::TrialInfo]) {
    let mut expected_start = 0;
    for t in infos {
        assert_eq!(t.relative_start_idx, expected_start, "gap or overlap at {t:?}");
        assert_eq!(t.relative_stop_idx - t.relative_start_idx, t.stop_idx - t.start_idx);
        expected_start = t.relative_stop_idx;
    }
}
