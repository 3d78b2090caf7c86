//! Date parsing and day arithmetic.
//!
//! Every date that enters a derivation goes through [`parse_timestamp`].
//! The backend is inconsistent about formats (MySQL `DATETIME`, ISO strings
//! with an offset, bare `DATE` columns), so the parser accepts all of them and
//! returns `None` for anything else instead of failing the whole snapshot.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Naive date-time layouts tried after RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Date-only layout.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a raw wire date into a wall-clock timestamp.
///
/// Values with an explicit offset keep their local wall-clock time; bare dates
/// resolve to the start of that day.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .map(start_of_day)
}

/// Parse an optional raw date, treating absence like a parse failure.
pub fn parse_optional(raw: Option<&str>) -> Option<NaiveDateTime> {
    raw.and_then(parse_timestamp)
}

/// Parse a calendar date (`YYYY-MM-DD`, or any timestamp accepted by
/// [`parse_timestamp`]).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_timestamp(raw).map(|dt| dt.date())
}

/// 00:00:00.000 of the given day.
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// 23:59:59.999 of the given day.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    start_of_day(date) + Duration::milliseconds(86_399_999)
}

/// Whole calendar days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Whole calendar months elapsed from `earlier` to `later`.
///
/// A month only counts once the day-of-month has been reached, so
/// Jan 31 → Feb 28 is zero months. Returns 0 when `later` precedes `earlier`.
pub fn whole_months_between(earlier: NaiveDate, later: NaiveDate) -> u32 {
    if later <= earlier {
        return 0;
    }

    let mut months = (later.year() - earlier.year()) * 12 + later.month() as i32
        - earlier.month() as i32;
    if later.day() < earlier.day() {
        months -= 1;
    }

    months.max(0) as u32
}

/// Step back `months` calendar months, clamping to the last valid day.
pub fn months_before(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(chrono::Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

/// Step back `days` days, saturating at the earliest representable date.
pub fn days_before(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_mysql_datetime() {
        let dt = parse_timestamp("2024-03-05 14:30:00").unwrap();
        assert_eq!(dt.date(), date(2024, 3, 5));
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(14, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_iso_with_offset() {
        let dt = parse_timestamp("2024-03-05T14:30:00.000Z").unwrap();
        assert_eq!(dt.date(), date(2024, 3, 5));

        let dt = parse_timestamp("2024-03-05T23:30:00-06:00").unwrap();
        assert_eq!(dt.date(), date(2024, 3, 5));
    }

    #[test]
    fn test_parse_bare_date_is_start_of_day() {
        let dt = parse_timestamp("2024-03-05").unwrap();
        assert_eq!(dt, start_of_day(date(2024, 3, 5)));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("   ").is_none());
        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp("2024-13-45").is_none());
        assert!(parse_optional(None).is_none());
    }

    #[test]
    fn test_end_of_day() {
        let end = end_of_day(date(2024, 3, 5));
        assert_eq!(end.date(), date(2024, 3, 5));
        assert_eq!(
            end.time(),
            NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap()
        );
    }

    #[test]
    fn test_days_between() {
        assert_eq!(days_between(date(2024, 1, 1), date(2024, 1, 31)), 30);
        assert_eq!(days_between(date(2024, 1, 31), date(2024, 1, 1)), -30);
    }

    #[test]
    fn test_whole_months_between() {
        assert_eq!(whole_months_between(date(2024, 1, 15), date(2024, 4, 15)), 3);
        assert_eq!(whole_months_between(date(2024, 1, 31), date(2024, 2, 28)), 0);
        assert_eq!(whole_months_between(date(2024, 5, 1), date(2024, 1, 1)), 0);
    }

    #[test]
    fn test_months_before() {
        assert_eq!(months_before(date(2024, 3, 31), 1), date(2024, 2, 29));
    }
}
