//! # Rating Aggregation
//!
//! Exponential moving average over booking feedback:
//!
//! ```text
//! new = old + weight × (input − old)
//! ```
//!
//! `weight = 1` replaces the score with the latest feedback; smaller weights
//! give more inertia. The result is clamped onto the rating scale and
//! rounded to hundredths by [`Rating::clamped`], so the fold carries no
//! hidden state and is reproducible across runs.

use tryshare_core::{Rating, ValidationError};

/// Aggregation rule applied by both booking operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingPolicy {
    weight: f64,
}

impl RatingPolicy {
    /// Weight used when none is configured.
    pub const DEFAULT_WEIGHT: f64 = 0.5;

    /// Build an exponential-moving-average policy. `weight` must be in `(0, 1]`.
    pub fn exponential(weight: f64) -> Result<Self, ValidationError> {
        if !weight.is_finite() || weight <= 0.0 || weight > 1.0 {
            return Err(ValidationError::InvalidRatingWeight(weight));
        }
        Ok(Self { weight })
    }

    /// The configured smoothing weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Fold one piece of feedback into the current score.
    pub fn fold(&self, current: Rating, input: Rating) -> Rating {
        let old = current.value();
        Rating::clamped(old + self.weight * (input.value() - old))
    }
}

impl Default for RatingPolicy {
    fn default() -> Self {
        Self {
            weight: Self::DEFAULT_WEIGHT,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Same starting score and input always produce the same score.
        #[test]
        fn fold_is_deterministic(
            old in 0.0f64..=5.0,
            input in 0.0f64..=5.0,
            weight in 0.01f64..=1.0,
        ) {
            let policy = RatingPolicy::exponential(weight).unwrap();
            let old = Rating::new(old).unwrap();
            let input = Rating::new(input).unwrap();
            let a = policy.fold(old, input);
            let b = policy.fold(old, input);
            prop_assert_eq!(a.value().to_bits(), b.value().to_bits());
        }

        /// The folded score lies between the old score and the input
        /// (up to rounding) and never leaves the scale.
        #[test]
        fn fold_stays_between_old_and_input(
            old in 0.0f64..=5.0,
            input in 0.0f64..=5.0,
            weight in 0.01f64..=1.0,
        ) {
            let policy = RatingPolicy::exponential(weight).unwrap();
            let old = Rating::new(old).unwrap();
            let input = Rating::new(input).unwrap();
            let new = policy.fold(old, input).value();
            let lo = old.value().min(input.value()) - 0.005;
            let hi = old.value().max(input.value()) + 0.005;
            prop_assert!(new >= lo && new <= hi, "{} not in [{}, {}]", new, lo, hi);
        }
    }
}
