//! Split configuration.
//!
//! [`SplitConfig`] holds every tunable parameter of the trial split. All
//! fields have defaults matching the values the downstream training runs
//! were produced with.
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SplitError};

/// How the trials of each gesture group are assigned to the training side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrainingType {
    /// Earliest trials of each gesture train, the rest test.
    #[default]
    TrainFirst,
    /// Latest trials of each gesture train, the earlier ones test.
    TrainLast,
    /// Each gesture group is shuffled with a seeded generator, then split
    /// like [`TrainingType::TrainFirst`].
    TrainRandom,
}

impl TrainingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingType::TrainFirst => "train_first",
            TrainingType::TrainLast => "train_last",
            TrainingType::TrainRandom => "train_random",
        }
    }
}

impl fmt::Display for TrainingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrainingType {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "train_first" => Ok(TrainingType::TrainFirst),
            "train_last" => Ok(TrainingType::TrainLast),
            "train_random" => Ok(TrainingType::TrainRandom),
            other => Err(SplitError::InvalidTrainingType(other.to_string())),
        }
    }
}

/// Configuration for [`generate_train_test_split`](crate::generate_train_test_split).
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use kinsplit::{SplitConfig, TrainingType};
///
/// let cfg = SplitConfig {
///     train_ratio: 0.8,
///     training_type: TrainingType::TrainLast,
///     ..SplitConfig::default()
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SplitConfig {
    /// Fraction of each gesture group assigned to training.
    ///
    /// The per-group split point is `round(len * train_ratio)` with ties
    /// rounded to even.
    ///
    /// Default: `0.7`.
    pub train_ratio: f64,

    /// A channel is active during a trial when its peak absolute value is
    /// strictly greater than this.
    ///
    /// Default: `0.1`.
    pub activation_threshold: f32,

    /// Ordering policy used when splitting each gesture group.
    ///
    /// Default: [`TrainingType::TrainFirst`].
    pub training_type: TrainingType,

    /// Keep trials with more than one active channel.
    ///
    /// Default: `false`.
    pub include_combined: bool,

    /// Seed for the per-call generator used by [`TrainingType::TrainRandom`].
    ///
    /// Default: `2025`.
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_ratio: 0.7,
            activation_threshold: 0.1,
            training_type: TrainingType::TrainFirst,
            include_combined: false,
            seed: 2025,
        }
    }
}

impl SplitConfig {
    /// Check ranges of the numeric fields.
    pub fn validate(&self) -> Result<()> {
        if !(self.train_ratio > 0.0 && self.train_ratio < 1.0) {
            return Err(SplitError::InvalidTrainRatio(self.train_ratio));
        }
        if !self.activation_threshold.is_finite() || self.activation_threshold < 0.0 {
            return Err(SplitError::InvalidThreshold(self.activation_threshold));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = SplitConfig::default();
        assert_eq!(cfg.train_ratio, 0.7);
        assert_eq!(cfg.activation_threshold, 0.1);
        assert_eq!(cfg.training_type, TrainingType::TrainFirst);
        assert!(!cfg.include_combined);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn training_type_parses_known_names() {
        for t in [TrainingType::TrainFirst, TrainingType::TrainLast, TrainingType::TrainRandom] {
            assert_eq!(t.as_str().parse::<TrainingType>().unwrap(), t);
        }
    }

    #[test]
    fn unknown_training_type_is_rejected() {
        let err = "train_middle".parse::<TrainingType>().unwrap_err();
        assert_eq!(err, SplitError::InvalidTrainingType("train_middle".into()));
    }

    #[test]
    fn ratio_bounds() {
        for r in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            let cfg = SplitConfig { train_ratio: r, ..SplitConfig::default() };
            assert!(cfg.validate().is_err(), "ratio {r} accepted");
        }
    }

    #[test]
    fn negative_threshold_rejected() {
        let cfg = SplitConfig { activation_threshold: -0.1, ..SplitConfig::default() };
        assert_eq!(cfg.validate(), Err(SplitError::InvalidThreshold(-0.1)));
    }
}
