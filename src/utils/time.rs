use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Whole milliseconds since the Unix epoch for a calendar date-time taken as
/// UTC. Sub-second components are truncated.
pub fn to_epoch_millis(dt: &NaiveDateTime) -> i64 {
    dt.and_utc().timestamp() * 1000
}

/// Same as [`to_epoch_millis`], ignoring any offset already attached to the
/// input: the calendar fields are reused as UTC, not shifted.
pub fn datetime_to_epoch_millis<Tz: TimeZone>(dt: &DateTime<Tz>) -> i64 {
    to_epoch_millis(&dt.naive_local())
}

/// 00:00:00 UTC on the same calendar day.
pub fn utc_midnight(dt: &DateTime<Utc>) -> DateTime<Utc> {
    dt.date_naive().and_time(NaiveTime::MIN).and_utc()
}
