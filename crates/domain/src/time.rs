//! Time and timestamp helpers.
//!
//! Everything is normalised to UTC before it reaches the queue; the queue
//! itself only sees whole Unix seconds.

use chrono::{DateTime, TimeZone, Utc};

/// UTC timestamp used for `scheduled_at`, `created_at`, `updated_at`.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Build a timestamp from whole Unix seconds.
///
/// Out-of-range values clamp to the Unix epoch.
#[must_use]
pub fn from_unix(secs: i64) -> Timestamp {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_roundtrip_whole_seconds() {
        let ts = from_unix(1_700_000_000);
        assert_eq!(ts.timestamp(), 1_700_000_000);
    }
}
