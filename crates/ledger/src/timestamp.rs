use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use core_types::DateOrder;

// `%Y` also accepts one- and two-digit years; anything earlier than this is a truncated year.
const MIN_YEAR: i32 = 1900;

// Year-first layouts carry no day/month ambiguity.
const YEAR_FIRST_DATETIME: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %I:%M %p",
];
const YEAR_FIRST_DATE: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const MONTH_FIRST_DATETIME: &[&str] = &[
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m-%d-%Y %I:%M:%S %p",
    "%m-%d-%Y %H:%M:%S%.f",
    "%m-%d-%Y %H:%M",
];
const MONTH_FIRST_DATE: &[&str] = &["%m/%d/%Y", "%m-%d-%Y"];

const DAY_FIRST_DATETIME: &[&str] = &[
    "%d/%m/%Y %I:%M:%S %p",
    "%d/%m/%Y %I:%M %p",
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %I:%M:%S %p",
    "%d-%m-%Y %H:%M:%S%.f",
    "%d-%m-%Y %H:%M",
    "%d.%m.%Y %H:%M:%S%.f",
    "%d.%m.%Y %H:%M",
];
const DAY_FIRST_DATE: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// Parses a trade-log timestamp without the caller naming a format.
///
/// Year-first layouts are tried first. All-numeric dates are read in `order`, and
/// only fall back to the opposite order when `order` cannot yield a valid date.
/// Years before 1900, such as the `24` in `1/5/24`, are rejected rather than read literally.
pub fn parse_timestamp(raw: &str, order: DateOrder) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    try_layouts(value, YEAR_FIRST_DATETIME, YEAR_FIRST_DATE)
        .or_else(|| try_order(value, order))
        .or_else(|| try_order(value, order.opposite()))
}

fn try_order(value: &str, order: DateOrder) -> Option<NaiveDateTime> {
    match order {
        DateOrder::MonthFirst => try_layouts(value, MONTH_FIRST_DATETIME, MONTH_FIRST_DATE),
        DateOrder::DayFirst => try_layouts(value, DAY_FIRST_DATETIME, DAY_FIRST_DATE),
    }
}

fn try_layouts(value: &str, datetime: &[&str], date: &[&str]) -> Option<NaiveDateTime> {
    datetime
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            date.iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .filter(|dt| dt.year() >= MIN_YEAR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_us_export_with_meridiem() {
        assert_eq!(
            parse_timestamp("1/5/2024 9:31:00 AM", DateOrder::MonthFirst),
            Some(dt(2024, 1, 5, 9, 31, 0))
        );
        assert_eq!(
            parse_timestamp("12/31/2023 3:15:42 PM", DateOrder::MonthFirst),
            Some(dt(2023, 12, 31, 15, 15, 42))
        );
    }

    #[test]
    fn test_iso_layouts() {
        assert_eq!(
            parse_timestamp("2024-01-05 09:31:00", DateOrder::MonthFirst),
            Some(dt(2024, 1, 5, 9, 31, 0))
        );
        assert_eq!(
            parse_timestamp("2024-01-05T09:31", DateOrder::DayFirst),
            Some(dt(2024, 1, 5, 9, 31, 0))
        );
        assert_eq!(
            parse_timestamp("2024-01-05", DateOrder::MonthFirst),
            Some(dt(2024, 1, 5, 0, 0, 0))
        );
    }

    #[test]
    fn test_ambiguous_dates_follow_requested_order() {
        assert_eq!(
            parse_timestamp("03/04/2024 10:00", DateOrder::MonthFirst),
            Some(dt(2024, 3, 4, 10, 0, 0))
        );
        assert_eq!(
            parse_timestamp("03/04/2024 10:00", DateOrder::DayFirst),
            Some(dt(2024, 4, 3, 10, 0, 0))
        );
    }

    #[test]
    fn test_unambiguous_dates_ignore_requested_order() {
        assert_eq!(
            parse_timestamp("25/03/2024 10:00", DateOrder::MonthFirst),
            Some(dt(2024, 3, 25, 10, 0, 0))
        );
        assert_eq!(
            parse_timestamp("03/25/2024", DateOrder::DayFirst),
            Some(dt(2024, 3, 25, 0, 0, 0))
        );
    }

    #[test]
    fn test_unparseable_values() {
        assert_eq!(parse_timestamp("", DateOrder::MonthFirst), None);
        assert_eq!(parse_timestamp("yesterday", DateOrder::MonthFirst), None);
        assert_eq!(parse_timestamp("13/13/2024", DateOrder::MonthFirst), None);
    }

    #[test]
    fn test_two_digit_years_are_rejected() {
        assert_eq!(parse_timestamp("1/5/24 9:31:00 AM", DateOrder::MonthFirst), None);
        assert_eq!(parse_timestamp("1/5/24", DateOrder::MonthFirst), None);
        assert_eq!(parse_timestamp("05.01.24 10:00", DateOrder::DayFirst), None);
        assert_eq!(
            parse_timestamp("1/5/1999", DateOrder::MonthFirst),
            Some(dt(1999, 1, 5, 0, 0, 0))
        );
    }
}
