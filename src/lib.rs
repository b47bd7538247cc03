//! # kinsplit — gesture-stratified train/test splits for kinematic sessions
//!
//! `kinsplit` turns one recording session (an `[N, D]` kinematic matrix, its
//! sample clock, and raw trial start/stop event markers) into training and
//! test index streams that keep every gesture proportionally represented on
//! both sides.
//!
//! ## Pipeline overview
//!
//! ```text
//! session.safetensors
//!   │
//!   ├─ io::SessionData::load()      kinematics, nip_time, trial markers
//!   ├─ resolve::resolve_markers()   event timestamps → sample indices (searchsorted, left)
//!   ├─ trial::validate_trials()     pair by position, drop degenerate ranges
//!   ├─ gesture::classify_trials()   per-channel peak |x| > threshold → dof_3_pos / combo_…
//!   ├─ split::stratified_split()    per-gesture split (train_first | train_last | train_random)
//!   └─ split::create_trial_info()   chronological order + gapless stitched offsets
//!        │
//!        └─→ SplitResult { train_idxs, test_idxs, train_info, test_info, report }
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use kinsplit::{generate_train_test_split, SplitConfig};
//! use kinsplit::io::SessionData;
//!
//! let session = SessionData::load("data/session.safetensors".as_ref()).unwrap();
//! let split = generate_train_test_split(
//!     session.kinematics.view(),
//!     &session.timestamps,
//!     &session.trial_start_timestamps,
//!     &session.trial_stop_timestamps,
//!     &SplitConfig::default(),
//! ).unwrap();
//!
//! let x_train = split.train_kinematics(session.kinematics.view());
//! println!("{} train samples over {} trials", x_train.nrows(), split.train_info.len());
//! ```
//!
//! ## Running individual stages
//!
//! ```
//! use kinsplit::resolve::resolve_markers;
//! use kinsplit::trial::validate_trials;
//! use kinsplit::gesture::classify_trials;
//! use ndarray::Array2;
//!
//! let kinematics: Array2<f32> = Array2::zeros((1000, 4));
//! let clock: Vec<i64> = (0..1000).collect();
//!
//! let starts = resolve_markers(&clock, &[100, 300]);
//! let stops  = resolve_markers(&clock, &[150, 400]);
//! let valid  = validate_trials(&starts, &stops, kinematics.nrows());
//! let classified = classify_trials(&valid.trials, kinematics.view(), 0.1);
//! assert_eq!(classified.n_unclassified, 2); // all-zero signal
//! ```

pub mod config;
pub mod error;
pub mod gesture;
pub mod io;
pub mod resolve;
pub mod split;
pub mod trial;

use ndarray::ArrayView2;
use tracing::{info, warn};

// ── Crate-root re-exports ─────────────────────────────────────────────────

pub use config::{SplitConfig, TrainingType};
pub use error::{Result, SplitError};
pub use gesture::{
    classify_trial, classify_trials, classify_window, Activation, ClassifiedTrial, Direction,
    DofActivation, GestureId,
};
pub use resolve::{resolve_markers, searchsorted_left};
pub use split::{
    create_trial_info, group_by_gesture, locate, split_group, stitch, stratified_split,
    GestureCount, GestureGroup, SplitReport, SplitResult, TrialInfo,
};
pub use trial::{check_pair, validate_trials, PairStatus, Trial};

/// Split one session into gesture-stratified **train/test index streams**.
///
/// # Steps
///
/// 1. Validate `cfg` and the shape of the inputs.
/// 2. Map start/stop timestamps onto sample indices (first sample at or after
///    each marker).
/// 3. Pair markers by position, truncating the longer list, and keep pairs
///    with `start < stop < N`.
/// 4. Label each trial with its gesture; trials with no active channel are
///    dropped.
/// 5. Drop combined trials unless [`SplitConfig::include_combined`].
/// 6. Split each gesture group of ≥ 2 trials at `round(len · train_ratio)`.
/// 7. Sort each side chronologically, assign stitched offsets and build the
///    index streams.
///
/// # Arguments
///
/// * `kinematics`       – `[N, D]` samples, one row per timestamp.
/// * `timestamps`       – `N` ascending sample times.
/// * `start_timestamps` – trial start markers, same clock as `timestamps`.
/// * `stop_timestamps`  – trial stop markers; may differ in length from the starts.
/// * `cfg`              – see [`SplitConfig`].
///
/// # Errors
///
/// Only for invalid configuration, a timestamp vector that does not match the
/// number of samples, or unsorted timestamps. Every per-trial problem is
/// recovered from and shows up in [`SplitResult::report`]. When nothing
/// survives, both sides are empty.
///
/// # Examples
///
/// ```
/// use kinsplit::{generate_train_test_split, SplitConfig};
/// use ndarray::Array2;
///
/// let mut k = Array2::<f32>::zeros((100, 1));
/// for start in [10, 30, 50] {
///     k.slice_mut(ndarray::s![start..start + 5, 0]).fill(0.5);
/// }
/// let ts: Vec<i64> = (0..100).collect();
/// let split = generate_train_test_split(
///     k.view(), &ts, &[10, 30, 50], &[15, 35, 55], &SplitConfig::default(),
/// ).unwrap();
/// assert_eq!(split.train_idxs, vec![10, 11, 12, 13, 14, 30, 31, 32, 33, 34]);
/// assert_eq!(split.test_idxs, vec![50, 51, 52, 53, 54]);
/// ```
pub fn generate_train_test_split<T: PartialOrd>(
    kinematics: ArrayView2<f32>,
    timestamps: &[T],
    start_timestamps: &[T],
    stop_timestamps: &[T],
    cfg: &SplitConfig,
) -> Result<SplitResult> {
    info!("generating training and test sets");
    cfg.validate()?;
    let n_samples = kinematics.nrows();
    if timestamps.len() != n_samples {
        return Err(SplitError::TimestampLengthMismatch {
            timestamps: timestamps.len(),
            samples: n_samples,
        });
    }
    resolve::check_ascending(timestamps)?;

    info!("converting trial timestamps to array indices");
    let start_idxs = resolve_markers(timestamps, start_timestamps);
    let stop_idxs = resolve_markers(timestamps, stop_timestamps);

    let valid = validate_trials(&start_idxs, &stop_idxs, n_samples);
    info!(n_valid = valid.trials.len(), "found valid trials");

    let classified = classify_trials(&valid.trials, kinematics, cfg.activation_threshold);

    let mut report = SplitReport {
        n_pairs: valid.n_pairs,
        n_truncated: valid.n_truncated,
        n_degenerate: valid.n_degenerate,
        n_unclassified: classified.n_unclassified,
        n_single: classified.n_single,
        n_combined: classified.n_combined,
        ..SplitReport::default()
    };
    let (train, test) = stratified_split(classified.trials, cfg, &mut report);

    let train_info = create_trial_info(&train);
    let test_info = create_trial_info(&test);
    if train_info.is_empty() && test_info.is_empty() {
        warn!("no training or test trials found, returning empty split");
        return Ok(SplitResult { report, ..SplitResult::default() });
    }

    let result = SplitResult {
        train_idxs: stitch(&train_info),
        test_idxs: stitch(&test_info),
        train_info,
        test_info,
        report,
    };
    info!(
        n_train = result.train_idxs.len(),
        n_test = result.test_idxs.len(),
        "split complete"
    );
    Ok(result)
}
