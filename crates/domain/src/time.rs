//! Time and timestamp helpers.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::error::ValidationError;

/// UTC timestamp used for `created_at`, `started_at`, `last_triggered`, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Milliseconds elapsed between two timestamps, clamped at zero.
#[must_use]
pub fn elapsed_ms(start: Timestamp, end: Timestamp) -> i64 {
    (end - start).num_milliseconds().max(0)
}

/// Parse an IANA timezone name such as `Europe/Paris`.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidTimezone`] for an unknown name.
pub fn parse_timezone(name: &str) -> Result<Tz, ValidationError> {
    name.trim()
        .parse()
        .map_err(|_| ValidationError::InvalidTimezone(name.to_string()))
}
