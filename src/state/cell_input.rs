//! Edit-boundary parsing and formatting. Input is validated here, before any
//! command is built, so commands only ever carry legal values.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::ValidationError;
use crate::state::data_model::DateFormat;

fn date_pattern(format: DateFormat) -> &'static str {
    match format {
        DateFormat::MmDdYyyy => "%m/%d/%Y",
        DateFormat::DdMmYyyy => "%d/%m/%Y",
        DateFormat::YyyyMmDd => "%Y/%m/%d",
        DateFormat::Full => "%B %d, %Y",
    }
}

fn format_name(format: DateFormat) -> &'static str {
    match format {
        DateFormat::MmDdYyyy => "MM/DD/YYYY",
        DateFormat::DdMmYyyy => "DD/MM/YYYY",
        DateFormat::YyyyMmDd => "YYYY/MM/DD",
        DateFormat::Full => "Month D, YYYY",
    }
}

/// Parses a date typed in `format` into unix milliseconds at UTC midnight.
pub fn parse_date_input(input: &str, format: DateFormat) -> Result<i64, ValidationError> {
    let invalid = || ValidationError::Date {
        input: input.to_string(),
        format: format_name(format).to_string(),
    };

    let trimmed = input.trim();
    // Numeric formats must be fully zero-padded so 1/2/2023 and 01/02/2023
    // are not both accepted.
    if format != DateFormat::Full && trimmed.len() != 10 {
        return Err(invalid());
    }
    let date = NaiveDate::parse_from_str(trimmed, date_pattern(format)).map_err(|_| invalid())?;
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
    Ok(midnight.and_utc().timestamp_millis())
}

pub fn is_valid_date_input(input: &str, format: DateFormat) -> bool {
    parse_date_input(input, format).is_ok()
}

fn to_utc(unix_ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(unix_ms)
}

pub fn format_date(unix_ms: i64, format: DateFormat) -> String {
    let Some(time) = to_utc(unix_ms) else {
        return String::new();
    };
    match format {
        DateFormat::Full => time.format("%B %-d, %Y").to_string(),
        other => time.format(date_pattern(other)).to_string(),
    }
}

/// Date plus wall-clock time, used by creation / last-edited time cells.
pub fn format_date_time(unix_ms: i64, format: DateFormat) -> String {
    let Some(time) = to_utc(unix_ms) else {
        return String::new();
    };
    format!("{} {}", format_date(unix_ms, format), time.format("%-I:%M %p"))
}

/// Accepts partially typed numbers ("", "-", "1.", "-0.5").
pub fn is_valid_number_input(input: &str) -> bool {
    let body = input.strip_prefix('-').unwrap_or(input);
    let mut seen_dot = false;
    body.chars().all(|ch| match ch {
        '0'..='9' => true,
        '.' if !seen_dot => {
            seen_dot = true;
            true
        }
        _ => false,
    })
}

pub fn parse_number_input(input: &str) -> Result<f64, ValidationError> {
    let trimmed = input.trim();
    let invalid = || ValidationError::Number(input.to_string());
    if trimmed.is_empty() || !is_valid_number_input(trimmed) {
        return Err(invalid());
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(invalid)
}

/// True when stored markdown holds a complete number.
pub fn is_number(markdown: &str) -> bool {
    parse_number_input(markdown).is_ok()
}

pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    if value.fract() == 0.0 {
        return format!("{value:.0}");
    }
    let mut out = format!("{value:.6}");
    while out.ends_with('0') {
        out.pop();
    }
    if out.ends_with('.') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mm_dd_yyyy() {
        let ms = parse_date_input("12/31/2023", DateFormat::MmDdYyyy).unwrap();
        assert_eq!(format_date(ms, DateFormat::MmDdYyyy), "12/31/2023");
        assert_eq!(format_date(ms, DateFormat::YyyyMmDd), "2023/12/31");
        assert_eq!(format_date(ms, DateFormat::Full), "December 31, 2023");
    }

    #[test]
    fn test_reject_swapped_day_month() {
        assert!(!is_valid_date_input("31/12/2023", DateFormat::MmDdYyyy));
        assert!(!is_valid_date_input("2023/12/31", DateFormat::MmDdYyyy));
        assert!(!is_valid_date_input("12/32/2023", DateFormat::MmDdYyyy));
        assert!(!is_valid_date_input("", DateFormat::MmDdYyyy));
        assert!(is_valid_date_input("31/12/2023", DateFormat::DdMmYyyy));
        assert!(!is_valid_date_input("12/31/2023", DateFormat::DdMmYyyy));
    }

    #[test]
    fn test_partial_number_input() {
        assert!(is_valid_number_input(""));
        assert!(is_valid_number_input("-"));
        assert!(is_valid_number_input("1."));
        assert!(!is_valid_number_input("1.2.3"));
        assert!(!is_valid_number_input("abc"));
        assert!(parse_number_input("-").is_err());
        assert_eq!(parse_number_input(" 42.5 "), Ok(42.5));
    }

    #[test]
    fn test_format_number_trims_zeros() {
        assert_eq!(format_number(27.5), "27.5");
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(f64::NAN), "");
    }
}
