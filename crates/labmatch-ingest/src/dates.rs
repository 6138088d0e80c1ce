//! Date parsing for the cohort and lab extracts.
//!
//! Cohort reference dates come as `DD-Mon-YY` (for example `15-Mar-21`).
//! Two-digit years follow the POSIX `%y` pivot: `00`-`68` map to 2000-2068
//! and `69`-`99` to 1969-1999. Four-digit years and ISO `YYYY-MM-DD` are
//! accepted as well.
//!
//! Lab collection dates are ISO `YYYY-MM-DD`, optionally followed by a time
//! part, or `YYYY/MM/DD`.

use chrono::NaiveDate;

/// Human-readable form of the reference date format, used in errors.
pub const REFERENCE_DATE_FORMAT: &str = "DD-Mon-YY";

/// Human-readable form of the collection date format, used in errors.
pub const COLLECTION_DATE_FORMAT: &str = "YYYY-MM-DD";

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    let prefix = lower.get(..3)?;
    let position = MONTHS.iter().position(|month| *month == prefix)?;
    // Full month names are accepted, other suffixes are not.
    if lower.len() > 3 && !full_month_name(position).starts_with(&lower) {
        return None;
    }
    u32::try_from(position + 1).ok()
}

fn full_month_name(index: usize) -> &'static str {
    const FULL: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    FULL[index]
}

fn expand_year(raw: &str) -> Option<i32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i32 = raw.parse().ok()?;
    match raw.len() {
        2 if value <= 68 => Some(2000 + value),
        2 => Some(1900 + value),
        4 => Some(value),
        _ => None,
    }
}

/// Parse a cohort reference date.
///
/// Returns `None` for blank or malformed values.
pub fn parse_reference_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parts: Vec<&str> = trimmed.split(['-', ' ']).collect();
    if let [day, month, year] = parts.as_slice()
        && let Some(month) = month_number(month)
    {
        if day.is_empty() || day.len() > 2 || !day.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let day: u32 = day.parse().ok()?;
        let year = expand_year(year)?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

/// Parse a lab collection date.
///
/// Any time part after `T` or a space is ignored. Returns `None` for blank
/// or malformed values.
pub fn parse_collection_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let date_part = trimmed
        .split(['T', ' '])
        .next()
        .unwrap_or_default();
    if date_part.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%Y/%m/%d"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn reference_date_two_digit_year() {
        assert_eq!(parse_reference_date("15-Mar-21"), Some(date(2021, 3, 15)));
        assert_eq!(parse_reference_date("1-jan-00"), Some(date(2000, 1, 1)));
        assert_eq!(parse_reference_date("31-DEC-68"), Some(date(2068, 12, 31)));
        assert_eq!(parse_reference_date("01-Jul-69"), Some(date(1969, 7, 1)));
        assert_eq!(parse_reference_date("09-Sep-99"), Some(date(1999, 9, 9)));
    }

    #[test]
    fn reference_date_alternate_forms() {
        assert_eq!(
            parse_reference_date(" 10-Jan-2020 "),
            Some(date(2020, 1, 10))
        );
        assert_eq!(parse_reference_date("10 January 2020"), Some(date(2020, 1, 10)));
        assert_eq!(parse_reference_date("2020-01-10"), Some(date(2020, 1, 10)));
    }

    #[test]
    fn reference_date_rejects_garbage() {
        assert_eq!(parse_reference_date(""), None);
        assert_eq!(parse_reference_date("   "), None);
        assert_eq!(parse_reference_date("30-Feb-21"), None);
        assert_eq!(parse_reference_date("15-Mrz-21"), None);
        assert_eq!(parse_reference_date("15-Marx-21"), None);
        assert_eq!(parse_reference_date("15-Mar-021"), None);
        assert_eq!(parse_reference_date("2020/13/45"), None);
    }

    #[test]
    fn collection_date_forms() {
        assert_eq!(parse_collection_date("2021-03-01"), Some(date(2021, 3, 1)));
        assert_eq!(
            parse_collection_date("2021-03-01T08:30:00"),
            Some(date(2021, 3, 1))
        );
        assert_eq!(
            parse_collection_date("2021-03-01 08:30"),
            Some(date(2021, 3, 1))
        );
        assert_eq!(parse_collection_date("2021/03/01"), Some(date(2021, 3, 1)));
        assert_eq!(parse_collection_date(""), None);
        assert_eq!(parse_collection_date("01-Mar-21"), None);
    }
}
