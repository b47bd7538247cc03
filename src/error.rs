//! Error types for the split engine.
//!
//! Only configuration and input-shape problems are errors. Everything the
//! pipeline can recover from (mismatched marker counts, degenerate pairs,
//! silent trials, empty splits) is logged and counted in
//! [`SplitReport`](crate::split::SplitReport) instead.
use thiserror::Error;

/// Result type alias.
pub type Result<T> = std::result::Result<T, SplitError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplitError {
    /// `training_type` string is not one of the three known policies.
    #[error("invalid training type '{0}' (expected train_first, train_last or train_random)")]
    InvalidTrainingType(String),

    /// `train_ratio` outside the open interval (0, 1).
    #[error("train ratio must lie in (0, 1), got {0}")]
    InvalidTrainRatio(f64),

    /// Negative or non-finite activation threshold.
    #[error("activation threshold must be finite and >= 0, got {0}")]
    InvalidThreshold(f32),

    /// Sample timestamps do not cover the kinematic rows one-to-one.
    #[error("{timestamps} sample timestamps for {samples} kinematic samples")]
    TimestampLengthMismatch { timestamps: usize, samples: usize },

    /// String is not a `dof_<n>_<dir>` or `combo_...` gesture label.
    #[error("invalid gesture id '{0}'")]
    InvalidGestureId(String),

    /// Sample timestamps must be ascending for the index search.
    #[error("sample timestamps decrease at index {0}")]
    UnsortedTimestamps(usize),
}
