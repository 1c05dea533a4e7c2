use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Returns the current time in the configured timezone.
pub fn now_in_timezone(tz: &Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(tz)
}

/// Returns today's date in the configured timezone.
pub fn today_local(tz: &Tz) -> NaiveDate {
    now_in_timezone(tz).date_naive()
}

/// Half-open interval `[first day of month, first day of next month)` with
/// both edges at local midnight in `tz`.
pub fn month_bounds(year: i32, month: u32, tz: &Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start_of_day(start, tz), start_of_day(next, tz)))
}

/// The instant `date` begins in `tz`. When a DST gap swallows midnight the
/// day starts at the first local time that exists.
pub fn start_of_day(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = NaiveDateTime::new(date, NaiveTime::MIN);
    (0..=2)
        .find_map(|hours| {
            tz.from_local_datetime(&(midnight + Duration::hours(hours)))
                .earliest()
        })
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Parses an RFC 3339 timestamp or a bare `YYYY-MM-DD` date. A bare date is
/// read in `tz` and taken as the start of the day, or the last instant of it
/// when `end_of_day`.
pub fn parse_datetime_value(value: &str, end_of_day: bool, tz: &Tz) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    if end_of_day {
        let next = date.succ_opt()?;
        Some(start_of_day(next, tz) - Duration::nanoseconds(1))
    } else {
        Some(start_of_day(date, tz))
    }
}
