//! # Validation Errors
//!
//! Input that fails validation is rejected here, at the boundary, so the
//! booking state machine only ever sees well-formed values.

use thiserror::Error;

/// Input rejected before it could reach the state machine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Rating is NaN or infinite.
    #[error("rating must be a finite number, got {0}")]
    NonFiniteRating(f64),

    /// Rating lies outside the accepted scale.
    #[error("rating {value} is outside the accepted range [{min}, {max}]")]
    RatingOutOfRange {
        /// The rejected value.
        value: f64,
        /// Lower bound (inclusive).
        min: f64,
        /// Upper bound (inclusive).
        max: f64,
    },

    /// Aggregation weight must lie in `(0, 1]`.
    #[error("rating weight must be in (0, 1], got {0}")]
    InvalidRatingWeight(f64),

    /// Tricycle identifiers are strictly positive.
    #[error("tricycle id must be positive, got {0}")]
    InvalidTricycleId(i64),
}
