//! Date/time utilities for FastNews.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

/// Compute the next wall-clock fire time for an "every N hours" cadence.
///
/// Fire times are the instants whose local hour in `tz` is a multiple of
/// `every_hours` with zero minutes and seconds. The result is strictly after
/// `now`. Local times that do not exist (DST gaps) are skipped.
pub fn next_fire_time(now: DateTime<Utc>, every_hours: u32, tz: &Tz) -> DateTime<Utc> {
    let every_hours = every_hours.max(1);
    let local = now.with_timezone(tz).naive_local();
    let hour_start = local
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(local);

    // Two days of candidates always contain a match for a divisor of 24.
    for step in 0..=48 {
        let candidate = hour_start + Duration::hours(step);
        if candidate.hour() % every_hours != 0 {
            continue;
        }
        if let Some(at) = tz.from_local_datetime(&candidate).earliest() {
            let at = at.with_timezone(&Utc);
            if at > now {
                return at;
            }
        }
    }

    now + Duration::hours(i64::from(every_hours))
}

/// Format a `DateTime<Utc>` in the given time zone.
pub fn format_in_timezone(dt: &DateTime<Utc>, tz: &Tz, format: &str) -> String {
    dt.with_timezone(tz).format(format).to_string()
}

/// Parse a stored timestamp (RFC3339 or SQLite `YYYY-MM-DD HH:MM:SS`, UTC).
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
