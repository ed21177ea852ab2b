use crate::types::errors::ParseError;
use chrono::NaiveDateTime;
use serde::{de, Deserialize, Deserializer};

/// Accepted textual forms, tried in order. The first successful parse wins, so the
/// order is significant for strings that satisfy more than one pattern.
const TIMESTAMP_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    // ISO local date-time: optional fractional seconds, or no seconds at all.
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M"
];

/// Parses a free-form deal timestamp into a local date-time.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, ParseError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ParseError::EmptyTimestamp);
    }

    TIMESTAMP_FORMATS.iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| ParseError::InvalidTimestamp(value.to_string()))
}

/// Serde adapter so JSON deals accept the same timestamp forms as CSV rows.
pub fn deserialize_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(value) => parse_timestamp(&value).map(Some).map_err(de::Error::custom),
        None => Ok(None)
    }
}
