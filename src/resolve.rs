//! Timestamp-to-index resolution.
//!
//! Event markers and kinematic samples are stamped on the same clock but
//! sampled independently. Each marker is mapped onto the first sample at or
//! after it (`numpy.searchsorted(..., side="left")`).
//!
//! A marker later than the last sample resolves to `timestamps.len()`. That
//! index is out of range and is rejected by the trial validator, never
//! dereferenced.
use crate::error::{Result, SplitError};

/// Leftmost index `i` with `sorted[i] >= value`, or `sorted.len()`.
///
/// `sorted` must be ascending.
pub fn searchsorted_left<T: PartialOrd>(sorted: &[T], value: &T) -> usize {
    sorted.partition_point(|t| t < value)
}

/// Resolve every marker in `markers` against the sample clock.
///
/// Output has the same length and order as `markers`.
pub fn resolve_markers<T: PartialOrd>(timestamps: &[T], markers: &[T]) -> Vec<usize> {
    markers.iter().map(|m| searchsorted_left(timestamps, m)).collect()
}

/// Return an error naming the first index where `timestamps` decreases.
pub fn check_ascending<T: PartialOrd>(timestamps: &[T]) -> Result<()> {
    match timestamps.windows(2).position(|w| w[1] < w[0]) {
        Some(i) => Err(SplitError::UnsortedTimestamps(i + 1)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_insertion_semantics() {
        let ts = [10_i64, 20, 20, 30];
        assert_eq!(searchsorted_left(&ts, &5), 0);
        assert_eq!(searchsorted_left(&ts, &10), 0);
        assert_eq!(searchsorted_left(&ts, &15), 1);
        // Duplicates: leftmost match.
        assert_eq!(searchsorted_left(&ts, &20), 1);
        assert_eq!(searchsorted_left(&ts, &30), 3);
    }

    #[test]
    fn past_end_resolves_to_len() {
        let ts = [0_i64, 1, 2];
        assert_eq!(searchsorted_left(&ts, &99), 3);
    }

    #[test]
    fn empty_clock() {
        let ts: [i64; 0] = [];
        assert_eq!(resolve_markers(&ts, &[1, 2]), vec![0, 0]);
    }

    #[test]
    fn resolve_keeps_marker_order() {
        let ts: Vec<i64> = (0..100).map(|i| i * 10).collect();
        let idx = resolve_markers(&ts, &[505, 15, 990, 2000]);
        assert_eq!(idx, vec![51, 2, 99, 100]);
    }

    #[test]
    fn float_clock() {
        let ts = [0.0_f64, 0.5, 1.0, 1.5];
        assert_eq!(resolve_markers(&ts, &[0.25, 1.0]), vec![1, 2]);
    }

    #[test]
    fn ascending_check() {
        assert!(check_ascending(&[1_i64, 1, 2, 3]).is_ok());
        assert_eq!(check_ascending(&[1_i64, 3, 2]), Err(SplitError::UnsortedTimestamps(2)));
    }
}
