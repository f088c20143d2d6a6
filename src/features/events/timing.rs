//! Weekday/hour to absolute UTC time

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc, Weekday};

/// Next `weekday` at `hour:00` UTC strictly after `now`.
///
/// `None` when `hour` is not a valid hour of the day.
pub fn next_occurrence(now: DateTime<Utc>, weekday: Weekday, hour: u32) -> Option<DateTime<Utc>> {
    if hour > 23 {
        return None;
    }

    let days_ahead = (7 + weekday.num_days_from_monday() as i64
        - now.weekday().num_days_from_monday() as i64)
        % 7;
    let date = now.date_naive() + Duration::days(days_ahead);
    let candidate = Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0)?);

    if candidate <= now {
        Some(candidate + Duration::days(7))
    } else {
        Some(candidate)
    }
}

/// Parse a weekday name as offered by the `/event` command choices
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    name.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_later_same_day() {
        // Saturday 10:00 -> Saturday 14:00
        let now = at(2025, 11, 8, 10, 0);
        assert_eq!(
            next_occurrence(now, Weekday::Sat, 14),
            Some(at(2025, 11, 8, 14, 0))
        );
    }

    #[test]
    fn test_already_passed_today_rolls_a_week() {
        let now = at(2025, 11, 8, 14, 30);
        assert_eq!(
            next_occurrence(now, Weekday::Sat, 14),
            Some(at(2025, 11, 15, 14, 0))
        );
    }

    #[test]
    fn test_exact_now_rolls_a_week() {
        let now = at(2025, 11, 8, 14, 0);
        assert_eq!(
            next_occurrence(now, Weekday::Sat, 14),
            Some(at(2025, 11, 15, 14, 0))
        );
    }

    #[test]
    fn test_later_in_week_and_month_boundary() {
        // Friday 2025-10-31 -> Monday 2025-11-03
        let now = at(2025, 10, 31, 23, 0);
        assert_eq!(
            next_occurrence(now, Weekday::Mon, 0),
            Some(at(2025, 11, 3, 0, 0))
        );
    }

    #[test]
    fn test_invalid_hour() {
        assert_eq!(next_occurrence(at(2025, 11, 8, 0, 0), Weekday::Sat, 24), None);
    }

    #[test]
    fn test_parse_weekday() {
        assert_eq!(parse_weekday("Saturday"), Some(Weekday::Sat));
        assert_eq!(parse_weekday("mon"), Some(Weekday::Mon));
        assert_eq!(parse_weekday("someday"), None);
    }
}
