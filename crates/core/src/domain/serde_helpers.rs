//! Field-level serde adapters for payloads written by the rule service and
//! its clients.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer};

/// Accepts RFC 3339 timestamps and offset-less `YYYY-MM-DDTHH:MM:SS[.f]`
/// values. The latter are read as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let raw = raw.trim();
    match raw.parse::<DateTime<Utc>>() {
        Ok(at) => Ok(at),
        Err(error) => raw
            .parse::<NaiveDateTime>()
            .map(|naive| Utc.from_utc_datetime(&naive))
            .map_err(|_| error),
    }
}

pub fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(|error| de::Error::custom(format!("`{raw}`: {error}")))
}

pub fn timestamp_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| {
            parse_timestamp(&raw).map_err(|error| de::Error::custom(format!("`{raw}`: {error}")))
        })
        .transpose()
}
