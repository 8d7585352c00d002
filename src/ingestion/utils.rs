//! Utility functions for common operations

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Cell values treated as missing, same spellings pandas uses
const NULL_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

// Month-first before day-first for slashed and dashed dates
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %B %Y",
];

// Month without a day; parsed as the 1st
const MONTH_FORMATS: &[&str] = &["%b %Y", "%B %Y", "%Y-%m", "%Y/%m"];

pub fn is_null_token(value: &str) -> bool {
    NULL_TOKENS.contains(&value.trim())
}

/// Permissive date parser: returns None instead of failing
pub fn parse_posted_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if is_null_token(value) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }

    if let Some(date) = parse_date_only(value).or_else(|| parse_month_only(value)) {
        return Some(date);
    }

    // "15/01/2020 10:30" style - date followed by a time we don't need
    let (head, _) = value.split_once(' ')?;
    parse_date_only(head)
}

fn parse_date_only(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

fn parse_month_only(value: &str) -> Option<NaiveDate> {
    let with_day = format!("{} 01", value);
    MONTH_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(&with_day, &format!("{} %d", format)).ok()
    })
}

/// Parse a price cell; missing, non-numeric and non-finite values are None
pub fn parse_rate(value: &str) -> Option<f64> {
    if is_null_token(value) {
        return None;
    }
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|rate| rate.is_finite())
}

/// "Jan 2024" style label
pub fn month_label(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}

/// Round half to even at `dp` decimal places, numpy style: the value is
/// scaled in f64 first, so 4.35 -> 43.5 -> 44 -> 4.4
pub fn round_to(value: f64, dp: u32) -> f64 {
    let scale = 10f64.powi(dp as i32);
    Decimal::from_f64_retain(value * scale)
        .and_then(|scaled| scaled.round().to_f64())
        .map(|rounded| rounded / scale)
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_parse_iso_dates() {
        assert_eq!(parse_posted_date("2020-01-15"), ymd(2020, 1, 15));
        assert_eq!(parse_posted_date(" 2020-01-15 "), ymd(2020, 1, 15));
        assert_eq!(parse_posted_date("2020/01/15"), ymd(2020, 1, 15));
        assert_eq!(parse_posted_date("2020-01-15 08:30:00"), ymd(2020, 1, 15));
        assert_eq!(parse_posted_date("2020-01-15T08:30:00"), ymd(2020, 1, 15));
        assert_eq!(parse_posted_date("2020-01-15T08:30:00+05:30"), ymd(2020, 1, 15));
    }

    #[test]
    fn test_parse_slashed_dates() {
        // Ambiguous dates are month-first
        assert_eq!(parse_posted_date("01/02/2020"), ymd(2020, 1, 2));
        // Falls back to day-first when month-first is impossible
        assert_eq!(parse_posted_date("25/12/2023"), ymd(2023, 12, 25));
        assert_eq!(parse_posted_date("25/12/2023 10:30"), ymd(2023, 12, 25));
    }

    #[test]
    fn test_parse_named_months() {
        assert_eq!(parse_posted_date("15 Jan 2020"), ymd(2020, 1, 15));
        assert_eq!(parse_posted_date("Jan 15, 2020"), ymd(2020, 1, 15));
        assert_eq!(parse_posted_date("January 15, 2020"), ymd(2020, 1, 15));
    }

    #[test]
    fn test_parse_dashed_dates_month_first() {
        assert_eq!(parse_posted_date("01-02-2020"), ymd(2020, 1, 2));
        // Day-first only when the first field can't be a month
        assert_eq!(parse_posted_date("15-01-2020"), ymd(2020, 1, 15));
    }

    #[test]
    fn test_parse_month_only_dates() {
        assert_eq!(parse_posted_date("Jan 2020"), ymd(2020, 1, 1));
        assert_eq!(parse_posted_date("January 2020"), ymd(2020, 1, 1));
        assert_eq!(parse_posted_date("2020-01"), ymd(2020, 1, 1));
        assert_eq!(parse_posted_date("2020/11"), ymd(2020, 11, 1));
        assert_eq!(parse_posted_date("2020-13"), None);
    }

    #[test]
    fn test_parse_invalid_dates() {
        assert_eq!(parse_posted_date(""), None);
        assert_eq!(parse_posted_date("NaN"), None);
        assert_eq!(parse_posted_date("invalid"), None);
        assert_eq!(parse_posted_date("2020-13-40"), None);
        assert_eq!(parse_posted_date("3 days ago"), None);
    }

    #[test]
    fn test_parse_rate() {
        assert_eq!(parse_rate("5000"), Some(5000.0));
        assert_eq!(parse_rate(" 4321.5 "), Some(4321.5));
        assert_eq!(parse_rate(""), None);
        assert_eq!(parse_rate("NA"), None);
        assert_eq!(parse_rate("nan"), None);
        assert_eq!(parse_rate("inf"), None);
        assert_eq!(parse_rate("on request"), None);
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label(ymd(2024, 1, 31).unwrap()), "Jan 2024");
        assert_eq!(month_label(ymd(2019, 9, 1).unwrap()), "Sep 2019");
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(17.768_728, 2), 17.77);
        assert_eq!(round_to(3.095_104, 1), 3.1);
        assert_eq!(round_to(55.0, 0), 55.0);
        assert_eq!(round_to(54.6, 0), 55.0);

        // Exact midpoints go to the even neighbour
        assert_eq!(round_to(0.25, 1), 0.2);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(3.5, 0), 4.0);
    }

    #[test]
    fn test_round_to_scales_before_rounding() {
        // 4.35 is stored just below 4.35, but 4.35 * 10 is exactly 43.5
        assert_eq!(round_to(4.35, 1), 4.4);
        assert_eq!(round_to(0.125, 2), 0.12);
    }

    #[test]
    fn test_round_to_non_finite() {
        assert!(round_to(f64::NAN, 2).is_nan());
        assert_eq!(round_to(f64::INFINITY, 2), f64::INFINITY);
    }
}
