use anyhow::{anyhow, Result};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Calendar dates are exchanged as DD.MM.YYYY throughout the bot and the
/// database, matching what users see on the inline calendar.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| anyhow!("Expected a date in DD.MM.YYYY format, got '{}'", raw.trim()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Combines a stored date and slot label into the appointment instant.
pub fn booking_datetime(date: &str, time: &str) -> Result<NaiveDateTime> {
    let date = parse_date(date)?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .map_err(|_| anyhow!("Expected a time in HH:MM format, got '{}'", time.trim()))?;
    Ok(date.and_time(time))
}

/// SQL LIKE pattern matching every DD.MM.YYYY date within one month.
pub fn month_like_pattern(year: i32, month: u32) -> String {
    format!("__.{month:02}.{year:04}")
}

pub fn in_month(date: NaiveDate, year: i32, month: u32) -> bool {
    date.year() == year && date.month() == month
}

pub fn prev_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_y, next_m) = next_month(year, month);
    let first_of_next =
        NaiveDate::from_ymd_opt(next_y, next_m, 1).unwrap_or(NaiveDate::MAX);
    (first_of_next - Duration::days(1)).day()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_calendar_dates() {
        let d = parse_date("01.01.2099").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2099, 1, 1).unwrap());
        assert_eq!(format_date(d), "01.01.2099");
        assert!(parse_date("2099-01-01").is_err());
        assert!(parse_date("32.01.2099").is_err());
    }

    #[test]
    fn combines_date_and_slot() {
        let dt = booking_datetime("15.07.2026", "10:00").unwrap();
        assert_eq!(dt.to_string(), "2026-07-15 10:00:00");
        assert!(booking_datetime("15.07.2026", "25:00").is_err());
        assert!(booking_datetime("oops", "10:00").is_err());
    }

    #[test]
    fn month_pattern_matches_only_that_month() {
        assert_eq!(month_like_pattern(2026, 7), "__.07.2026");
        assert_eq!(month_like_pattern(2026, 12), "__.12.2026");
    }

    #[test]
    fn month_navigation_wraps() {
        assert_eq!(prev_month(2026, 1), (2025, 12));
        assert_eq!(prev_month(2026, 7), (2026, 6));
        assert_eq!(next_month(2026, 12), (2027, 1));
        assert_eq!(next_month(2026, 7), (2026, 8));
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2028, 2), 29);
        assert_eq!(days_in_month(2026, 7), 31);
        assert_eq!(days_in_month(2026, 12), 31);
    }
}
