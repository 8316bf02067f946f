//! # Tricycle Identity
//!
//! A tricycle is addressed by a positive integer assigned at provisioning
//! time. The newtype keeps ids from being confused with counts, indexes, or
//! rating values passed alongside them.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Unique, immutable identifier of a fleet tricycle.
///
/// Serializes as a bare integer so that clients see `{"id": 1}`.
/// Deserialization goes through [`TricycleId::new`], so a seed file or
/// request body cannot smuggle in a non-positive id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct TricycleId(i64);

impl TricycleId {
    /// Create a validated identifier. Zero and negative values are rejected.
    pub fn new(raw: i64) -> Result<Self, ValidationError> {
        if raw <= 0 {
            return Err(ValidationError::InvalidTricycleId(raw));
        }
        Ok(Self(raw))
    }

    /// The raw integer value.
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for TricycleId {
    type Error = ValidationError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<TricycleId> for i64 {
    fn from(id: TricycleId) -> Self {
        id.0
    }
}

impl std::fmt::Display for TricycleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tricycle:{}", self.0)
    }
}

impl std::str::FromStr for TricycleId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::InvalidTricycleId(0))?;
        Self::new(raw)
    }
}
