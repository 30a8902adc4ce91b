//! Date normalization for imported cells
//!
//! Spreadsheet serial numbers and common date strings become `DD/MM/YYYY`.
//! Anything unrecognized passes through as its text.

use crate::types::CellValue;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::ops::RangeInclusive;

/// Days between the spreadsheet epoch (1899-12-30) and the Unix epoch
pub const SERIAL_UNIX_OFFSET_DAYS: f64 = 25569.0;

pub const SECONDS_PER_DAY: f64 = 86400.0;

/// Display format for normalized dates (day-month-year, zero-padded)
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y";

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Month and year only; the date is the 1st of that month
const MONTH_YEAR_FORMATS: &[&str] = &["%B %Y", "%b %Y"];

/// Years a parsed string may land in. chrono's `%Y` takes any digit count,
/// so "1/2/21" would otherwise read as year 1.
const YEAR_RANGE: RangeInclusive<i32> = 1000..=9999;

/// Two-digit years below this are 20xx, the rest 19xx
const TWO_DIGIT_YEAR_PIVOT: i32 = 50;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Normalize a cell for display in a date column.
///
/// Empty, zero, `false` and the empty string produce an empty string.
/// Numbers are serial dates; text is parsed against the known formats.
pub fn normalize_date(value: &CellValue) -> String {
    match value {
        CellValue::Empty | CellValue::Bool(false) => String::new(),
        CellValue::Text(s) if s.is_empty() => String::new(),
        CellValue::Number(n) if *n == 0.0 || n.is_nan() => String::new(),
        CellValue::Number(n) => match serial_to_date(*n) {
            Some(date) => date.format(DISPLAY_FORMAT).to_string(),
            None => value.to_string(),
        },
        CellValue::Text(s) => match parse_date_str(s) {
            Some(date) => date.format(DISPLAY_FORMAT).to_string(),
            None => s.clone(),
        },
        CellValue::Bool(true) => value.to_string(),
    }
}

/// Convert a spreadsheet serial to a UTC calendar date.
/// The fractional part is a time of day and does not move the date.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let millis = ((serial - SERIAL_UNIX_OFFSET_DAYS) * SECONDS_PER_DAY * 1000.0).trunc();
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64).map(|dt| dt.date_naive())
}

/// Parse a date string, ignoring any time component.
/// Dates outside four-digit years are not accepted.
pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let parsed = DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.date_naive())
        .filter(in_year_range)
        .or_else(|| {
            DateTime::parse_from_rfc2822(s)
                .ok()
                .map(|dt| dt.date_naive())
                .filter(in_year_range)
        });
    if parsed.is_some() {
        return parsed;
    }

    DATETIME_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
        .chain(
            DATE_FORMATS
                .iter()
                .filter_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok()),
        )
        .find(in_year_range)
        .or_else(|| parse_short_year(s))
        .or_else(|| parse_month_year(s))
}

fn in_year_range(date: &NaiveDate) -> bool {
    YEAR_RANGE.contains(&date.year())
}

/// US `M/D/YY`
fn parse_short_year(s: &str) -> Option<NaiveDate> {
    let mut parts = s.split('/');
    let (month, day, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || year.len() != 2 {
        return None;
    }

    let month: u32 = digits(month)?;
    let day: u32 = digits(day)?;
    let year = digits(year)? as i32;
    let year = if year < TWO_DIGIT_YEAR_PIVOT {
        2000 + year
    } else {
        1900 + year
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_month_year(s: &str) -> Option<NaiveDate> {
    let padded = format!("{} 1", s);
    MONTH_YEAR_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(&padded, &format!("{} %d", fmt)).ok())
        .find(in_year_range)
}

fn digits(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_date() {
        assert_eq!(normalize_date(&CellValue::Number(44197.0)), "01/01/2021");
        assert_eq!(normalize_date(&CellValue::Number(25569.0)), "01/01/1970");
        assert_eq!(normalize_date(&CellValue::Number(1.0)), "31/12/1899");
    }

    #[test]
    fn test_serial_with_time_keeps_date() {
        assert_eq!(normalize_date(&CellValue::Number(44197.75)), "01/01/2021");
    }

    #[test]
    fn test_serial_matches_epoch_plus_days() {
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
        for n in [60.0, 10_000.0, 43_831.0, 45_658.0] {
            let expected = epoch + chrono::Duration::days(n as i64);
            assert_eq!(serial_to_date(n), Some(expected));
        }
    }

    #[test]
    fn test_falsy_values_are_blank() {
        assert_eq!(normalize_date(&CellValue::Empty), "");
        assert_eq!(normalize_date(&CellValue::text("")), "");
        assert_eq!(normalize_date(&CellValue::Number(0.0)), "");
        assert_eq!(normalize_date(&CellValue::Bool(false)), "");
    }

    #[test]
    fn test_iso_string() {
        assert_eq!(normalize_date(&CellValue::text("2021-01-01")), "01/01/2021");
        assert_eq!(
            normalize_date(&CellValue::text("2021-03-04T10:30:00")),
            "04/03/2021"
        );
        assert_eq!(
            normalize_date(&CellValue::text("2021-03-04T10:30:00Z")),
            "04/03/2021"
        );
    }

    #[test]
    fn test_us_and_named_month_strings() {
        assert_eq!(normalize_date(&CellValue::text("12/25/2020")), "25/12/2020");
        assert_eq!(normalize_date(&CellValue::text("March 5, 2020")), "05/03/2020");
        assert_eq!(normalize_date(&CellValue::text("5 Mar 2020")), "05/03/2020");
        assert_eq!(normalize_date(&CellValue::text("2020/07/09")), "09/07/2020");
    }

    #[test]
    fn test_unparseable_passes_through() {
        assert_eq!(normalize_date(&CellValue::text("next tuesday")), "next tuesday");
        assert_eq!(normalize_date(&CellValue::text("13/45/2020")), "13/45/2020");
        assert_eq!(normalize_date(&CellValue::Bool(true)), "true");
    }

    #[test]
    fn test_out_of_range_serial_passes_through() {
        let huge = CellValue::Number(1e300);
        assert_eq!(normalize_date(&huge), huge.to_string());
        assert_eq!(serial_to_date(f64::INFINITY), None);
    }

    #[test]
    fn test_two_digit_year() {
        assert_eq!(normalize_date(&CellValue::text("1/2/21")), "02/01/2021");
        assert_eq!(normalize_date(&CellValue::text("12/25/20")), "25/12/2020");
        assert_eq!(normalize_date(&CellValue::text("7/4/76")), "04/07/1976");
        assert_eq!(normalize_date(&CellValue::text("12/31/49")), "31/12/2049");
        assert_eq!(normalize_date(&CellValue::text("1/1/50")), "01/01/1950");
    }

    #[test]
    fn test_month_and_year() {
        assert_eq!(normalize_date(&CellValue::text("January 2021")), "01/01/2021");
        assert_eq!(normalize_date(&CellValue::text("Mar 2020")), "01/03/2020");
    }

    #[test]
    fn test_short_years_never_become_ancient_dates() {
        for input in ["1/2/3", "2021/1", "5/21", "1-2-21", "21/2/1", "13/25/21", "Jan 21"] {
            assert_eq!(normalize_date(&CellValue::text(input)), input);
        }
    }

    #[test]
    fn test_year_outside_four_digits_passes_through() {
        assert_eq!(normalize_date(&CellValue::text("0021-01-20")), "0021-01-20");
        assert_eq!(normalize_date(&CellValue::text("1/2/20211")), "1/2/20211");
        assert_eq!(parse_date_str("2/3/0001"), None);
    }
}
