//! Cron schedules: parsing of 5-field expressions and the missed-fire policy.
//!
//! Expressions use the classic `MIN HOUR DOM MON DOW` layout where day-of-week
//! `0` and `7` both mean Sunday. They are evaluated with the [`cron`] crate,
//! which expects a leading seconds field and counts weekdays from `SUN = 1`,
//! so the day-of-week field is rewritten into weekday names before parsing.

use std::str::FromStr;

use chrono::{DateTime, Duration, TimeZone};

use crate::error::ValidationError;
use crate::time::{self, Timestamp};

/// Default staleness bound for the startup backfill pass.
pub const DEFAULT_BACKFILL_THRESHOLD: Duration = Duration::hours(24);

const WEEKDAYS: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// A validated cron expression.
#[derive(Debug, Clone)]
pub struct CronSchedule {
    expression: String,
    schedule: cron::Schedule,
}

impl CronSchedule {
    /// Parse a 5-field cron expression.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCron`] when the expression does not
    /// have exactly five fields, any field is malformed, or it never fires
    /// again (e.g. `0 0 30 2 *`).
    pub fn parse(expression: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidCron {
            expression: expression.to_string(),
            reason,
        };

        let fields: Vec<&str> = expression.split_whitespace().collect();
        let [minute, hour, day_of_month, month, day_of_week] = fields.as_slice() else {
            return Err(invalid(format!("expected 5 fields, got {}", fields.len())));
        };

        let day_of_week = normalize_day_of_week(day_of_week).map_err(invalid)?;
        let full = format!("0 {minute} {hour} {day_of_month} {month} {day_of_week}");
        let schedule = cron::Schedule::from_str(&full).map_err(|err| invalid(err.to_string()))?;
        if schedule.after(&time::now()).next().is_none() {
            return Err(invalid("no upcoming fire".to_string()));
        }

        Ok(Self {
            expression: expression.to_string(),
            schedule,
        })
    }

    /// The expression as written by the user.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// First fire time strictly after `after`, in the timezone of `after`.
    #[must_use]
    pub fn next_after<Z: TimeZone>(&self, after: &DateTime<Z>) -> Option<DateTime<Z>> {
        self.schedule.after(after).next()
    }
}

impl std::fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.expression)
    }
}

/// Decide whether an automation missed a fire while the process was down.
///
/// This is a coarse staleness bound, not a replay of the cron expression: an
/// automation that never ran, or whose last run is older than `threshold`,
/// is considered to have missed a fire.
#[must_use]
pub fn is_missed(last_triggered: Option<Timestamp>, now: Timestamp, threshold: Duration) -> bool {
    match last_triggered {
        None => true,
        Some(last) => now - last > threshold,
    }
}

fn normalize_day_of_week(field: &str) -> Result<String, String> {
    if field == "*" || field == "?" {
        return Ok(field.to_string());
    }

    let mut days: Vec<String> = Vec::new();
    for part in field.split(',') {
        let (range, step) = match part.split_once('/') {
            Some((range, step)) => {
                let step: usize = step
                    .parse()
                    .map_err(|_| format!("invalid day-of-week step `{step}`"))?;
                if step == 0 {
                    return Err("day-of-week step must be positive".to_string());
                }
                (range, step)
            }
            None => (part, 1),
        };

        let Some((start, end)) = numeric_bounds(range) else {
            // Named weekdays are already in the form the parser expects.
            push_unique(&mut days, part.to_ascii_uppercase());
            continue;
        };
        if start > 7 || end > 7 || start > end {
            return Err(format!("day of week `{range}` is outside 0-7"));
        }
        for day in (start..=end).step_by(step) {
            push_unique(&mut days, WEEKDAYS[day % 7].to_string());
        }
    }
    Ok(days.join(","))
}

fn numeric_bounds(range: &str) -> Option<(usize, usize)> {
    if range == "*" {
        return Some((0, 6));
    }
    match range.split_once('-') {
        Some((start, end)) => Some((start.parse().ok()?, end.parse().ok()?)),
        None => range.parse().ok().map(|day| (day, day)),
    }
}

fn push_unique(days: &mut Vec<String>, day: String) {
    if !days.contains(&day) {
        days.push(day);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike, Utc, Weekday};

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn should_fire_at_top_of_next_hour() {
        let schedule = CronSchedule::parse("0 * * * *").unwrap();
        let next = schedule.next_after(&at(2026, 2, 22, 10, 30)).unwrap();
        assert_eq!((next.hour(), next.minute()), (11, 0));
    }

    #[test]
    fn should_fire_every_fifteen_minutes() {
        let schedule = CronSchedule::parse("*/15 * * * *").unwrap();
        let next = schedule.next_after(&at(2026, 2, 22, 10, 2)).unwrap();
        assert_eq!(next.minute(), 15);
    }

    #[test]
    fn should_treat_zero_and_seven_as_sunday() {
        // 2026-02-22 is a Sunday.
        let from = at(2026, 2, 20, 12, 0);
        for expr in ["0 9 * * 0", "0 9 * * 7"] {
            let next = CronSchedule::parse(expr).unwrap().next_after(&from).unwrap();
            assert_eq!(next.weekday(), Weekday::Sun, "{expr}");
            assert_eq!(next.day(), 22);
        }
    }

    #[test]
    fn should_map_weekday_range_to_monday_through_friday() {
        // Saturday evening: next weekday fire is Monday.
        let schedule = CronSchedule::parse("30 8 * * 1-5").unwrap();
        let next = schedule.next_after(&at(2026, 2, 21, 20, 0)).unwrap();
        assert_eq!(next.weekday(), Weekday::Mon);
        assert_eq!((next.hour(), next.minute()), (8, 30));
    }

    #[test]
    fn should_accept_range_ending_on_seven() {
        assert_eq!(normalize_day_of_week("5-7").unwrap(), "FRI,SAT,SUN");
    }

    #[test]
    fn should_expand_stepped_wildcard() {
        assert_eq!(normalize_day_of_week("*/2").unwrap(), "SUN,TUE,THU,SAT");
    }

    #[test]
    fn should_pass_named_days_through() {
        assert_eq!(normalize_day_of_week("mon-fri").unwrap(), "MON-FRI");
    }

    #[test]
    fn should_evaluate_in_requested_timezone() {
        let schedule = CronSchedule::parse("0 9 * * *").unwrap();
        let tz = chrono_tz::Europe::Paris;
        let from = tz.with_ymd_and_hms(2026, 6, 1, 10, 0, 0).unwrap();
        let next = schedule.next_after(&from).unwrap();
        assert_eq!(next.day(), 2);
        assert_eq!(next.hour(), 9);
        assert_eq!(next.with_timezone(&Utc).hour(), 7);
    }

    #[test]
    fn should_reject_wrong_field_count() {
        let err = CronSchedule::parse("0 * * *").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidCron { ref reason, .. } if reason == "expected 5 fields, got 4"));
    }

    #[test]
    fn should_reject_six_field_expression() {
        assert!(CronSchedule::parse("0 0 * * * *").is_err());
    }

    #[test]
    fn should_reject_out_of_range_minute() {
        assert!(CronSchedule::parse("61 * * * *").is_err());
    }

    #[test]
    fn should_reject_out_of_range_weekday() {
        assert!(CronSchedule::parse("0 0 * * 8").is_err());
    }

    #[test]
    fn should_reject_expression_that_never_fires() {
        let err = CronSchedule::parse("0 0 30 2 *").unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidCron {
                expression: "0 0 30 2 *".to_string(),
                reason: "no upcoming fire".to_string(),
            }
        );
    }

    #[test]
    fn should_keep_original_expression() {
        let schedule = CronSchedule::parse("0 8 * * 1").unwrap();
        assert_eq!(schedule.expression(), "0 8 * * 1");
        assert_eq!(schedule.to_string(), "0 8 * * 1");
    }

    #[test]
    fn should_report_missed_when_never_triggered() {
        assert!(is_missed(None, Utc::now(), DEFAULT_BACKFILL_THRESHOLD));
    }

    #[test]
    fn should_report_missed_when_older_than_threshold() {
        let now = Utc::now();
        let last = now - Duration::hours(25);
        assert!(is_missed(Some(last), now, DEFAULT_BACKFILL_THRESHOLD));
    }

    #[test]
    fn should_not_report_missed_when_recent() {
        let now = Utc::now();
        let last = now - Duration::hours(2);
        assert!(!is_missed(Some(last), now, DEFAULT_BACKFILL_THRESHOLD));
    }

    #[test]
    fn should_not_report_missed_at_exact_threshold() {
        let now = Utc::now();
        let last = now - DEFAULT_BACKFILL_THRESHOLD;
        assert!(!is_missed(Some(last), now, DEFAULT_BACKFILL_THRESHOLD));
    }
}
