//! Column encoding shared by the repositories.
//!
//! Identifiers are stored as hyphenated UUID text, timestamps as RFC 3339
//! text with a fixed microsecond precision (so that lexical order matches
//! chronological order), and structured fields as JSON text.

use std::str::FromStr;

use chrono::SecondsFormat;
use cronpilot_domain::time::Timestamp;
use serde::de::DeserializeOwned;

pub(crate) fn encode_ts(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_ts(value: &str) -> Result<Timestamp, sqlx::Error> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.to_utc())
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

pub(crate) fn decode_opt_ts(value: Option<String>) -> Result<Option<Timestamp>, sqlx::Error> {
    value.as_deref().map(decode_ts).transpose()
}

pub(crate) fn decode_json<T: DeserializeOwned>(value: &str) -> Result<T, sqlx::Error> {
    serde_json::from_str(value).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

pub(crate) fn decode_parsed<T>(value: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    T::from_str(value).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

pub(crate) fn decode_counter(value: i64) -> Result<u64, sqlx::Error> {
    u64::try_from(value).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

/// `LIMIT` parameter; `SQLite` takes a signed integer.
pub(crate) fn encode_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
