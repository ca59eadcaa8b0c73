//! Timestamp value object for immutable points in time.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Converts Unix seconds (Stripe's wire format) into a timestamp.
    ///
    /// Returns `None` for values chrono cannot represent.
    pub fn from_unix_seconds(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns Unix seconds.
    pub fn unix_seconds(&self) -> i64 {
        self.0.timestamp()
    }

    /// ISO-8601 form with a `Z` suffix, e.g. `2023-12-14T22:13:20Z`.
    pub fn to_iso8601(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_unix_seconds_renders_iso8601() {
        let ts = Timestamp::from_unix_seconds(1702592000).unwrap();
        assert_eq!(ts.to_iso8601(), "2023-12-14T22:13:20Z");
    }

    #[test]
    fn unix_seconds_round_trips() {
        let ts = Timestamp::from_unix_seconds(1_700_000_000).unwrap();
        assert_eq!(ts.unix_seconds(), 1_700_000_000);
    }

    #[test]
    fn from_unix_seconds_rejects_unrepresentable_values() {
        assert!(Timestamp::from_unix_seconds(i64::MAX).is_none());
    }

    #[test]
    fn now_is_ordered_after_epoch() {
        let epoch = Timestamp::from_unix_seconds(0).unwrap();
        assert!(Timestamp::now() > epoch);
    }
}
