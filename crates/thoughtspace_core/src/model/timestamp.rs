//! Millisecond-precision UTC timestamps.
//!
//! Stored documents carry timestamps as RFC 3339 strings with exactly three
//! fractional digits and a `Z` suffix (`2024-05-01T10:00:00.000Z`). Values
//! produced by [`now`] are truncated to milliseconds so they survive a
//! serialize/deserialize round trip unchanged.
//!
//! Use with `#[serde(with = "crate::model::timestamp")]`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Current time truncated to whole milliseconds.
pub fn now() -> DateTime<Utc> {
    let current = Utc::now();
    DateTime::from_timestamp_millis(current.timestamp_millis()).unwrap_or(current)
}

/// Formats a timestamp in the stored representation.
pub fn format(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(value))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|value| value.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}
