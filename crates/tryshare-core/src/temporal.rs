//! # Temporal Types
//!
//! `Timestamp` is the only time type used in tricycle transition logs:
//! always UTC, always truncated to whole seconds, rendered with a `Z`
//! suffix. Keeping sub-second noise out makes transition records stable
//! when they are persisted and reloaded.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// A UTC timestamp with seconds precision.
///
/// Deserialization goes through [`Timestamp::from_utc`], so stored values
/// are truncated on the way in as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "DateTime<Utc>")]
pub struct Timestamp(DateTime<Utc>);

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_utc(dt)
    }
}

impl Timestamp {
    /// Current UTC time, truncated.
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// Wrap a `DateTime<Utc>`, discarding sub-second precision.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt.with_nanosecond(0).unwrap_or(dt))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}
