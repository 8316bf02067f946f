//! # Rating Scale
//!
//! Ratings live on a closed `[0.0, 5.0]` scale. Both the stored tricycle
//! score and the feedback submitted with each booking operation use this
//! type, so out-of-range or non-finite values are rejected once, here.
//!
//! Stored ratings are kept at two-decimal precision. Rounding on
//! construction means the same fold of the same inputs yields the same
//! bits on every run and every platform.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Lowest accepted rating.
pub const MIN_RATING: f64 = 0.0;

/// Highest accepted rating.
pub const MAX_RATING: f64 = 5.0;

/// A validated rating in `[MIN_RATING, MAX_RATING]`, two-decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Rating(f64);

impl Rating {
    /// Validate and round a raw rating.
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteRating(value));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&value) {
            return Err(ValidationError::RatingOutOfRange {
                value,
                min: MIN_RATING,
                max: MAX_RATING,
            });
        }
        Ok(Self(round_to_hundredths(value)))
    }

    /// Build a rating from an arbitrary finite value, clamping it onto the scale.
    ///
    /// Used by aggregation rules whose arithmetic may drift a hair outside
    /// the bounds. Non-finite input collapses to `MIN_RATING`.
    pub fn clamped(value: f64) -> Self {
        if !value.is_finite() {
            return Self(MIN_RATING);
        }
        Self(round_to_hundredths(value.clamp(MIN_RATING, MAX_RATING)))
    }

    /// The raw score.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self(MIN_RATING)
    }
}

impl TryFrom<f64> for Rating {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for f64 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(Rating::new(0.0).unwrap().value(), 0.0);
        assert_eq!(Rating::new(5.0).unwrap().value(), 5.0);
    }

    #[test]
    fn out_of_range_rejected() {
        assert!(matches!(
            Rating::new(5.01),
            Err(ValidationError::RatingOutOfRange { .. })
        ));
        assert!(matches!(
            Rating::new(-0.5),
            Err(ValidationError::RatingOutOfRange { .. })
        ));
    }

    #[test]
    fn non_finite_rejected() {
        assert!(matches!(
            Rating::new(f64::NAN),
            Err(ValidationError::NonFiniteRating(_))
        ));
        assert!(Rating::new(f64::INFINITY).is_err());
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(Rating::new(3.14159).unwrap().value(), 3.14);
        assert_eq!(Rating::new(2.005).unwrap().to_string().len(), 4);
    }

    #[test]
    fn clamped_stays_on_scale() {
        assert_eq!(Rating::clamped(7.3).value(), MAX_RATING);
        assert_eq!(Rating::clamped(-1.0).value(), MIN_RATING);
        assert_eq!(Rating::clamped(f64::NAN).value(), MIN_RATING);
    }

    #[test]
    fn deserialization_validates() {
        assert!(serde_json::from_str::<Rating>("9.5").is_err());
        let r: Rating = serde_json::from_str("4.5").unwrap();
        assert_eq!(r.value(), 4.5);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any in-range value is accepted and stays in range after rounding.
        #[test]
        fn in_range_values_accepted(v in MIN_RATING..=MAX_RATING) {
            let r = Rating::new(v).unwrap();
            prop_assert!(r.value() >= MIN_RATING && r.value() <= MAX_RATING);
        }

        /// Clamping never leaves the scale, whatever the input.
        #[test]
        fn clamped_always_on_scale(v in any::<f64>()) {
            let r = Rating::clamped(v);
            prop_assert!(r.value() >= MIN_RATING && r.value() <= MAX_RATING);
        }
    }
}
