//! Stratified train/test split and stitching.
//!
//! Classified trials are grouped by gesture and each group of two or more
//! trials is divided at `round(len · train_ratio)` according to the
//! [`TrainingType`]. The selected trials of each side are then re-sorted
//! chronologically and laid end to end:
//!
//! ```text
//!  absolute   ....[a0  a1)......[b0    b1)...[c0 c1)....
//!  stitched   [0 ── a1-a0)[ ── b1-b0 ── )[ ─ c1-c0 ─)
//! ```
//!
//! The stitched index stream (`arange(a0, a1) ++ arange(b0, b1) ++ …`) is what
//! consumers use to gather rows from the original recording; [`TrialInfo`]
//! keeps both coordinate systems so a stitched position can be traced back
//! with [`locate`].
use std::collections::HashMap;

use ndarray::{Array2, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{SplitConfig, TrainingType};
use crate::gesture::{ClassifiedTrial, GestureId};

/// One trial of a split, in absolute and stitched coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialInfo {
    pub gesture_id: GestureId,
    pub start_idx: usize,
    pub stop_idx: usize,
    pub relative_start_idx: usize,
    pub relative_stop_idx: usize,
}

impl TrialInfo {
    pub fn len(&self) -> usize {
        self.stop_idx - self.start_idx
    }

    pub fn is_empty(&self) -> bool {
        self.stop_idx == self.start_idx
    }
}

/// Trials sharing one gesture, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GestureGroup {
    pub gesture: GestureId,
    pub trials: Vec<ClassifiedTrial>,
}

/// Train/test counts of one gesture group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureCount {
    pub gesture_id: GestureId,
    pub n_trials: usize,
    pub n_train: usize,
    pub n_test: usize,
}

/// Bookkeeping for every trial that entered the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitReport {
    /// Aligned start/stop pairs examined.
    pub n_pairs: usize,
    /// Markers discarded because the start and stop lists differed in length.
    pub n_truncated: usize,
    pub n_degenerate: usize,
    pub n_unclassified: usize,
    pub n_single: usize,
    pub n_combined: usize,
    /// Combined trials removed because `include_combined` was off.
    pub n_filtered_combined: usize,
    /// Gesture groups with fewer than two trials.
    pub n_skipped_groups: usize,
    /// Per-gesture counts in group order. Skipped groups have zero train and
    /// test trials.
    pub gesture_counts: Vec<GestureCount>,
}

impl SplitReport {
    /// Trials that survived validation.
    pub fn n_valid(&self) -> usize {
        self.n_pairs - self.n_degenerate
    }
}

/// Output of [`generate_train_test_split`](crate::generate_train_test_split).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitResult {
    /// Stitched sample indices of the training side.
    pub train_idxs: Vec<usize>,
    /// Stitched sample indices of the test side.
    pub test_idxs: Vec<usize>,
    pub train_info: Vec<TrialInfo>,
    pub test_info: Vec<TrialInfo>,
    pub report: SplitReport,
}

impl SplitResult {
    pub fn is_empty(&self) -> bool {
        self.train_info.is_empty() && self.test_info.is_empty()
    }

    /// Rows of `kinematics` ([N, D]) selected for training, in stitched order.
    pub fn train_kinematics(&self, kinematics: ArrayView2<f32>) -> Array2<f32> {
        kinematics.select(Axis(0), &self.train_idxs)
    }

    /// Rows of `kinematics` ([N, D]) selected for testing, in stitched order.
    pub fn test_kinematics(&self, kinematics: ArrayView2<f32>) -> Array2<f32> {
        kinematics.select(Axis(0), &self.test_idxs)
    }
}

/// Group trials by gesture. Groups appear in order of their first trial and
/// keep their trials in input order.
pub fn group_by_gesture(trials: Vec<ClassifiedTrial>) -> Vec<GestureGroup> {
    let mut index: HashMap<GestureId, usize> = HashMap::new();
    let mut groups: Vec<GestureGroup> = Vec::new();
    for t in trials {
        match index.get(&t.gesture) {
            Some(&g) => groups[g].trials.push(t),
            None => {
                index.insert(t.gesture.clone(), groups.len());
                groups.push(GestureGroup { gesture: t.gesture.clone(), trials: vec![t] });
            }
        }
    }
    groups
}

/// Number of training trials for a group of `n`: `round(n · ratio)`, ties to even.
pub fn split_point(n: usize, train_ratio: f64) -> usize {
    let k = (n as f64 * train_ratio).round_ties_even();
    (k.max(0.0) as usize).min(n)
}

/// Split one gesture group into `(train, test)`.
///
/// `rng` is only drawn from for [`TrainingType::TrainRandom`].
pub fn split_group<R: Rng + ?Sized>(
    mut trials: Vec<ClassifiedTrial>,
    train_ratio: f64,
    training_type: TrainingType,
    rng: &mut R,
) -> (Vec<ClassifiedTrial>, Vec<ClassifiedTrial>) {
    let n = trials.len();
    let k = split_point(n, train_ratio);
    match training_type {
        TrainingType::TrainFirst => {
            let test = trials.split_off(k);
            (trials, test)
        }
        TrainingType::TrainRandom => {
            trials.shuffle(rng);
            let test = trials.split_off(k);
            (trials, test)
        }
        TrainingType::TrainLast => {
            let train = trials.split_off(n - k);
            (train, trials)
        }
    }
}

/// Filter, group and split `trials`, filling the group-level fields of
/// `report`. Returns the selected `(train, test)` trials in group order.
///
/// A fresh generator seeded from `cfg.seed` is built for every call.
pub fn stratified_split(
    trials: Vec<ClassifiedTrial>,
    cfg: &SplitConfig,
    report: &mut SplitReport,
) -> (Vec<ClassifiedTrial>, Vec<ClassifiedTrial>) {
    let n_before = trials.len();
    let trials: Vec<ClassifiedTrial> = if cfg.include_combined {
        info!(n_trials = n_before, "including combined movements");
        trials
    } else {
        let kept: Vec<_> = trials.into_iter().filter(|t| !t.is_combined()).collect();
        report.n_filtered_combined = n_before - kept.len();
        info!(n_trials = kept.len(), "ignoring combined movements");
        kept
    };

    let groups = group_by_gesture(trials);
    info!("gesture representations:");
    for g in &groups {
        info!("- {}: {} trials", g.gesture, g.trials.len());
    }

    info!(
        training_type = %cfg.training_type,
        train_ratio = cfg.train_ratio,
        "splitting trials"
    );
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let (mut train, mut test) = (Vec::new(), Vec::new());
    for GestureGroup { gesture, trials } in groups {
        let n_trials = trials.len();
        if n_trials < 2 {
            report.n_skipped_groups += 1;
            report.gesture_counts.push(GestureCount { gesture_id: gesture, n_trials, n_train: 0, n_test: 0 });
            continue;
        }
        let (tr, te) = split_group(trials, cfg.train_ratio, cfg.training_type, &mut rng);
        info!("- {}: {} train, {} test", gesture, tr.len(), te.len());
        report.gesture_counts.push(GestureCount {
            gesture_id: gesture,
            n_trials,
            n_train: tr.len(),
            n_test: te.len(),
        });
        train.extend(tr);
        test.extend(te);
    }
    (train, test)
}

/// Sort trials chronologically and assign gapless stitched offsets.
pub fn create_trial_info(trials: &[ClassifiedTrial]) -> Vec<TrialInfo> {
    let mut sorted: Vec<&ClassifiedTrial> = trials.iter().collect();
    sorted.sort_by_key(|t| t.trial.start_idx);

    let mut offset = 0;
    sorted
        .into_iter()
        .map(|t| {
            let len = t.trial.len();
            let info = TrialInfo {
                gesture_id: t.gesture.clone(),
                start_idx: t.trial.start_idx,
                stop_idx: t.trial.stop_idx,
                relative_start_idx: offset,
                relative_stop_idx: offset + len,
            };
            offset += len;
            info
        })
        .collect()
}

/// Concatenate `start_idx..stop_idx` of every trial, in the given order.
pub fn stitch(infos: &[TrialInfo]) -> Vec<usize> {
    let total = infos.iter().map(TrialInfo::len).sum();
    let mut out = Vec::with_capacity(total);
    for info in infos {
        out.extend(info.start_idx..info.stop_idx);
    }
    out
}

/// Map a position in the stitched stream back to its trial and absolute
/// sample index. `infos` must come from [`create_trial_info`].
pub fn locate(infos: &[TrialInfo], relative_pos: usize) -> Option<(&TrialInfo, usize)> {
    let i = infos.partition_point(|t| t.relative_stop_idx <= relative_pos);
    let info = infos.get(i)?;
    (relative_pos >= info.relative_start_idx)
        .then(|| (info, info.start_idx + relative_pos - info.relative_start_idx))
}
