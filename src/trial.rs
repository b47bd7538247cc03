//! Trial validation.
//!
//! Start and stop markers arrive as two independent lists. They are paired by
//! position after truncating the longer list, and a pair becomes a [`Trial`]
//! only when `start < stop < n_samples`.
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Half-open sample range `[start_idx, stop_idx)` of one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trial {
    pub start_idx: usize,
    pub stop_idx: usize,
    /// Position of the marker pair in the raw event lists.
    pub original_idx: usize,
}

impl Trial {
    pub fn len(&self) -> usize {
        self.stop_idx - self.start_idx
    }

    pub fn is_empty(&self) -> bool {
        self.stop_idx == self.start_idx
    }
}

/// Outcome of checking one aligned start/stop pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairStatus {
    Valid(Trial),
    /// Empty, reversed, or running past the end of the sample stream.
    DegenerateRange {
        original_idx: usize,
        start_idx: usize,
        stop_idx: usize,
    },
}

/// Check the pair at position `original_idx` against a stream of
/// `n_samples` samples.
pub fn check_pair(start_idx: usize, stop_idx: usize, original_idx: usize, n_samples: usize) -> PairStatus {
    if start_idx < stop_idx && stop_idx < n_samples {
        PairStatus::Valid(Trial { start_idx, stop_idx, original_idx })
    } else {
        PairStatus::DegenerateRange { original_idx, start_idx, stop_idx }
    }
}

/// Result of [`validate_trials`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    /// Valid trials in marker order (not yet chronological).
    pub trials: Vec<Trial>,
    /// Number of aligned pairs examined.
    pub n_pairs: usize,
    /// Markers discarded by truncating the longer list.
    pub n_truncated: usize,
    /// Pairs rejected as degenerate.
    pub n_degenerate: usize,
}

/// Pair resolved start/stop indices by position and keep the valid ones.
///
/// When the lists differ in length the longer one is truncated and a warning
/// is logged; processing continues with the aligned prefix.
pub fn validate_trials(start_idxs: &[usize], stop_idxs: &[usize], n_samples: usize) -> Validation {
    let (n_starts, n_stops) = (start_idxs.len(), stop_idxs.len());
    if n_starts > n_stops {
        warn!(n_starts, n_stops, ?start_idxs, ?stop_idxs, "too many starts, truncating");
    } else if n_starts < n_stops {
        warn!(n_starts, n_stops, ?start_idxs, ?stop_idxs, "too many stops, truncating");
    }
    let n_pairs = n_starts.min(n_stops);

    let mut out = Validation {
        trials: Vec::with_capacity(n_pairs),
        n_pairs,
        n_truncated: n_starts.max(n_stops) - n_pairs,
        n_degenerate: 0,
    };
    for (i, (&start, &stop)) in start_idxs.iter().zip(stop_idxs).enumerate() {
        match check_pair(start, stop, i, n_samples) {
            PairStatus::Valid(t) => out.trials.push(t),
            PairStatus::DegenerateRange { .. } => {
                debug!(pair = i, start, stop, n_samples, "dropping degenerate trial");
                out.n_degenerate += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_pairs_kept_in_marker_order() {
        let v = validate_trials(&[50, 10], &[60, 20], 100);
        assert_eq!(v.trials.len(), 2);
        assert_eq!(v.trials[0], Trial { start_idx: 50, stop_idx: 60, original_idx: 0 });
        assert_eq!(v.trials[1], Trial { start_idx: 10, stop_idx: 20, original_idx: 1 });
        assert_eq!(v.n_degenerate, 0);
    }

    #[test]
    fn degenerate_pairs_dropped() {
        // empty, reversed, stop == len, valid
        let v = validate_trials(&[5, 30, 90, 1], &[5, 20, 100, 2], 100);
        assert_eq!(v.n_pairs, 4);
        assert_eq!(v.n_degenerate, 3);
        assert_eq!(v.trials, vec![Trial { start_idx: 1, stop_idx: 2, original_idx: 3 }]);
    }

    #[test]
    fn stop_at_last_sample_is_exclusive_bound() {
        assert!(matches!(check_pair(0, 99, 0, 100), PairStatus::Valid(_)));
        assert!(matches!(check_pair(0, 100, 0, 100), PairStatus::DegenerateRange { .. }));
    }

    #[test]
    fn more_starts_than_stops() {
        let v = validate_trials(&[0, 10, 20, 30, 40], &[5, 15, 25, 35], 100);
        assert_eq!(v.n_pairs, 4);
        assert_eq!(v.n_truncated, 1);
        assert_eq!(v.trials.len(), 4);
        assert_eq!(v.trials[3].original_idx, 3);
    }

    #[test]
    fn more_stops_than_starts() {
        let v = validate_trials(&[0], &[5, 15, 25], 100);
        assert_eq!(v.n_pairs, 1);
        assert_eq!(v.n_truncated, 2);
        assert_eq!(v.trials.len(), 1);
    }

    #[test]
    fn no_markers() {
        let v = validate_trials(&[], &[], 100);
        assert_eq!(v, Validation::default());
    }
}
