use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Get today's date in the given timezone, evaluated at the moment of the call.
///
/// The date is deliberately not cached anywhere: both the dashboard's month
/// cursor and the same-day deletion window must observe day changes during a
/// long-lived session.
pub fn local_date_today(local_offset: UtcOffset) -> time::Date {
    OffsetDateTime::now_utc().to_offset(local_offset).date()
}
