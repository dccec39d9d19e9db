// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Time primitives for captured events
//!
//! `Timestamp` is a wall-clock capture time. Subtracting two timestamps gives a
//! signed `TimeDelta`; durations stored on records are unsigned
//! `std::time::Duration` values and are serialized as microseconds. Capture
//! times carry microsecond precision so both survive serialization exactly.

use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Absolute point in time at which an event was captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current wall-clock time, truncated to microseconds
    pub fn now() -> Self {
        Self(Utc::now().trunc_subsecs(6))
    }

    /// Build from microseconds since the Unix epoch
    ///
    /// Values outside chrono's representable range clamp to the epoch.
    pub fn from_unix_micros(micros: i64) -> Self {
        Self(DateTime::from_timestamp_micros(micros).unwrap_or_default())
    }

    /// Microseconds since the Unix epoch
    pub fn unix_micros(&self) -> i64 {
        self.0.timestamp_micros()
    }

    /// Whole seconds since the Unix epoch
    pub fn to_unix_seconds(&self) -> i64 {
        self.0.timestamp()
    }

    /// Underlying chrono value
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Elapsed time since `earlier`, zero if `earlier` is actually later
    pub fn saturating_duration_since(&self, earlier: Timestamp) -> Duration {
        (*self - earlier).to_std().unwrap_or(Duration::ZERO)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl Sub for Timestamp {
    type Output = TimeDelta;

    fn sub(self, rhs: Timestamp) -> TimeDelta {
        self.0 - rhs.0
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        match TimeDelta::from_std(rhs) {
            Ok(delta) => Timestamp(self.0 + delta),
            Err(_) => self,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// Serde adapter storing a `Duration` as an integer count of microseconds
pub mod duration_micros {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        serializer.serialize_u64(micros)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let micros = u64::deserialize(deserializer)?;
        Ok(Duration::from_micros(micros))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtraction() {
        let earlier = Timestamp::from_unix_micros(1_000_000);
        let later = Timestamp::from_unix_micros(3_500_000);

        assert_eq!((later - earlier).num_microseconds(), Some(2_500_000));
        assert_eq!((earlier - later).num_microseconds(), Some(-2_500_000));
        assert_eq!(
            later.saturating_duration_since(earlier),
            Duration::from_micros(2_500_000)
        );
        assert_eq!(earlier.saturating_duration_since(later), Duration::ZERO);
    }

    #[test]
    fn test_now_is_microsecond_precision() {
        let now = Timestamp::now();
        assert_eq!(now.as_datetime().timestamp_subsec_nanos() % 1000, 0);
        assert_eq!(Timestamp::from_unix_micros(now.unix_micros()), now);
    }

    #[test]
    fn test_add_duration() {
        let start = Timestamp::from_unix_micros(0);
        let end = start + Duration::from_secs(2);

        assert_eq!(end.unix_micros(), 2_000_000);
        assert_eq!(end.to_unix_seconds(), 2);
        assert!(end > start);
    }

    #[test]
    fn test_serde_rfc3339() {
        let ts = Timestamp::from_unix_micros(1_700_000_000_123_456);
        let json = serde_json::to_string(&ts).unwrap();
        assert!(json.starts_with("\"2023-11-14T"));

        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn test_duration_micros() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            #[serde(with = "duration_micros")]
            d: Duration,
        }

        let json = serde_json::to_string(&Wrapper { d: Duration::from_millis(15) }).unwrap();
        assert_eq!(json, r#"{"d":15000}"#);

        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(back.d, Duration::from_millis(15));
    }
}
