//! Wall-clock timestamps for the vault item lifecycle.
//!
//! Item timestamps must never run backwards: `updatedAt` is refreshed on
//! every mutation and has to be strictly greater than the value it
//! replaces, even when the system clock stalls or steps back.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

/// Smallest step used to keep successive timestamps strictly increasing.
const MIN_STEP_MICROS: i64 = 1;

/// A UTC timestamp, serialized as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp at the current time.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Wraps an existing chrono timestamp.
    #[must_use]
    pub const fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Creates a timestamp from milliseconds since the Unix epoch.
    pub fn from_millis(millis: i64) -> Result<Self, TypesError> {
        Utc.timestamp_millis_opt(millis)
            .single()
            .map(Self)
            .ok_or_else(|| TypesError::InvalidTimestamp(format!("out of range: {millis}ms")))
    }

    /// Returns the underlying chrono timestamp.
    #[must_use]
    pub const fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Milliseconds since the Unix epoch.
    #[must_use]
    pub fn millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Returns the current time, or the smallest timestamp strictly after
    /// `previous` if the clock has not moved past it.
    #[must_use]
    pub fn advance_from(previous: &Self) -> Self {
        let now = Utc::now();
        if now > previous.0 {
            Self(now)
        } else {
            Self(previous.0 + Duration::microseconds(MIN_STEP_MICROS))
        }
    }

    /// Returns true if this timestamp is strictly before the other.
    #[must_use]
    pub fn is_before(&self, other: &Self) -> bool {
        self < other
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}
