//! Gesture classification.
//!
//! A trial's gesture is the set of channels (DOFs) whose peak absolute value
//! over the trial exceeds the activation threshold, each tagged with the sign
//! of its peak sample.
//!
//! ```text
//!   one active channel    →  dof_3_neg
//!   several active        →  combo_dof_2_pos-dof_5_neg
//!   none                  →  dropped
//! ```
//!
//! [`GestureId`] stores the DOFs ordered by channel; the label string is only
//! produced at serialization boundaries. In a `combo_` label the per-DOF
//! tokens are ordered lexicographically *as strings*, so `dof_10_pos` sorts
//! before `dof_2_pos`. Existing label files depend on that order.
use std::fmt;
use std::str::FromStr;

use ndarray::{s, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SplitError;
use crate::trial::Trial;

/// Sign of a channel's peak sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Pos,
    Neg,
}

impl Direction {
    /// `Pos` for a strictly positive peak, `Neg` otherwise (including `0.0`).
    pub fn of(peak: f32) -> Self {
        if peak > 0.0 {
            Direction::Pos
        } else {
            Direction::Neg
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Pos => "pos",
            Direction::Neg => "neg",
        }
    }
}

/// One active channel. `channel` is 0-based; labels are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DofActivation {
    pub channel: usize,
    pub direction: Direction,
}

impl DofActivation {
    pub fn new(channel: usize, direction: Direction) -> Self {
        Self { channel, direction }
    }

    /// `dof_{channel + 1}_{direction}`
    pub fn token(&self) -> String {
        format!("dof_{}_{}", self.channel + 1, self.direction.as_str())
    }

    fn parse_token(tok: &str) -> Option<Self> {
        let rest = tok.strip_prefix("dof_")?;
        let (num, dir) = rest.split_once('_')?;
        let n: usize = num.parse().ok()?;
        if n == 0 {
            return None;
        }
        let direction = match dir {
            "pos" => Direction::Pos,
            "neg" => Direction::Neg,
            _ => return None,
        };
        Some(Self::new(n - 1, direction))
    }
}

/// Canonical gesture identity: a non-empty set of DOF activations, at most
/// one per channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct GestureId {
    dofs: Vec<DofActivation>,
}

impl GestureId {
    /// Build from activations in any order. Returns `None` when empty.
    /// If a channel appears twice, the first occurrence wins.
    pub fn from_dofs(mut dofs: Vec<DofActivation>) -> Option<Self> {
        if dofs.is_empty() {
            return None;
        }
        // Stable sort keeps the first duplicate in front for dedup.
        dofs.sort_by_key(|d| d.channel);
        dofs.dedup_by_key(|d| d.channel);
        Some(Self { dofs })
    }

    pub fn single(dof: DofActivation) -> Self {
        Self { dofs: vec![dof] }
    }

    /// Activations ordered by channel.
    pub fn dofs(&self) -> &[DofActivation] {
        &self.dofs
    }

    pub fn is_combined(&self) -> bool {
        self.dofs.len() > 1
    }
}

impl fmt::Display for GestureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [dof] = self.dofs.as_slice() {
            return f.write_str(&dof.token());
        }
        let mut tokens: Vec<String> = self.dofs.iter().map(DofActivation::token).collect();
        tokens.sort();
        write!(f, "combo_{}", tokens.join("-"))
    }
}

impl FromStr for GestureId {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self, SplitError> {
        let bad = || SplitError::InvalidGestureId(s.to_string());
        if let Some(rest) = s.strip_prefix("combo_") {
            let dofs = rest
                .split('-')
                .map(DofActivation::parse_token)
                .collect::<Option<Vec<_>>>()
                .ok_or_else(bad)?;
            let n = dofs.len();
            let id = GestureId::from_dofs(dofs).ok_or_else(bad)?;
            // A combo needs two or more distinct channels.
            if id.dofs.len() != n || n < 2 {
                return Err(bad());
            }
            Ok(id)
        } else {
            DofActivation::parse_token(s).map(GestureId::single).ok_or_else(bad)
        }
    }
}

impl From<GestureId> for String {
    fn from(id: GestureId) -> String {
        id.to_string()
    }
}

impl TryFrom<String> for GestureId {
    type Error = SplitError;

    fn try_from(s: String) -> Result<Self, SplitError> {
        s.parse()
    }
}

/// Activation pattern of one trial window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// No channel crossed the threshold; the trial carries no gesture.
    NoActiveChannel,
    SingleActive(GestureId),
    MultiActive(GestureId),
}

impl Activation {
    pub fn gesture(&self) -> Option<&GestureId> {
        match self {
            Activation::NoActiveChannel => None,
            Activation::SingleActive(g) | Activation::MultiActive(g) => Some(g),
        }
    }
}

/// A valid trial with its gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedTrial {
    pub trial: Trial,
    pub gesture: GestureId,
}

impl ClassifiedTrial {
    pub fn is_combined(&self) -> bool {
        self.gesture.is_combined()
    }
}

/// Index and signed value of the first sample with the largest magnitude.
/// Returns `None` for an empty column or one containing any NaN; such a
/// channel is never active.
pub fn peak(column: ArrayView1<f32>) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in column.iter().enumerate() {
        if v.is_nan() {
            return None;
        }
        match best {
            Some((_, b)) if v.abs() <= b.abs() => {}
            _ => best = Some((i, v)),
        }
    }
    best
}

/// Classify a `[T, D]` window of kinematic samples.
pub fn classify_window(window: ArrayView2<f32>, threshold: f32) -> Activation {
    let dofs: Vec<DofActivation> = window
        .axis_iter(Axis(1))
        .enumerate()
        .filter_map(|(ch, col)| {
            let (_, value) = peak(col)?;
            (value.abs() > threshold).then(|| DofActivation::new(ch, Direction::of(value)))
        })
        .collect();

    match dofs.len() {
        0 => Activation::NoActiveChannel,
        1 => Activation::SingleActive(GestureId::single(dofs[0])),
        _ => match GestureId::from_dofs(dofs) {
            Some(id) => Activation::MultiActive(id),
            None => Activation::NoActiveChannel,
        },
    }
}

/// Classify one trial of `kinematics` ([N, D]).
pub fn classify_trial(trial: &Trial, kinematics: ArrayView2<f32>, threshold: f32) -> Activation {
    classify_window(kinematics.slice(s![trial.start_idx..trial.stop_idx, ..]), threshold)
}

/// Result of [`classify_trials`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Classified trials in input order.
    pub trials: Vec<ClassifiedTrial>,
    pub n_unclassified: usize,
    pub n_single: usize,
    pub n_combined: usize,
}

/// Classify every trial; silent trials are dropped and counted.
pub fn classify_trials(trials: &[Trial], kinematics: ArrayView2<f32>, threshold: f32) -> Classification {
    let mut out = Classification::default();
    for trial in trials {
        let gesture = match classify_trial(trial, kinematics, threshold) {
            Activation::NoActiveChannel => {
                debug!(trial = trial.original_idx, "no active channel, dropping trial");
                out.n_unclassified += 1;
                continue;
            }
            Activation::SingleActive(g) => {
                out.n_single += 1;
                g
            }
            Activation::MultiActive(g) => {
                out.n_combined += 1;
                g
            }
        };
        out.trials.push(ClassifiedTrial { trial: *trial, gesture });
    }
    out
}
