//! Date cells.
//!
//! Extracts spell dates several ways depending on how they were exported.
//! The year width decides between `%Y` and `%y`, since chrono would
//! happily read `22` as the year 22 under `%Y`.

use chrono::NaiveDate;

/// Output spelling of every date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Spellings with a month name, e.g. `Aug 25, 2022`.
const NAMED_MONTH_FORMATS: [&str; 2] = ["%B %d, %Y", "%d %B %Y"];

/// Parse a date cell.
///
/// Accepts `YYYY-MM-DD` and `YYYY/MM/DD` (optionally followed by a time),
/// `MM/DD/YYYY`, `MM/DD/YY`, `MM-DD-YYYY`, `MM-DD-YY`, and month names
/// (`Aug 25, 2022`, `25 August 2022`). Returns `None` for anything else.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Some(date) = NAMED_MONTH_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
    {
        return Some(date);
    }

    let date_part = value.split(|c: char| c == ' ' || c == 'T').next()?;
    let slashed = date_part.contains('/');
    let segments: Vec<&str> = date_part.split(|c: char| c == '/' || c == '-').collect();

    let format = match (segments.as_slice(), slashed) {
        ([year, _, _], false) if year.len() == 4 => DATE_FORMAT,
        ([year, _, _], true) if year.len() == 4 => "%Y/%m/%d",
        ([_, _, year], true) if year.len() == 4 => "%m/%d/%Y",
        ([_, _, year], true) if year.len() == 2 => "%m/%d/%y",
        ([_, _, year], false) if year.len() == 4 => "%m-%d-%Y",
        ([_, _, year], false) if year.len() == 2 => "%m-%d-%y",
        _ => return None,
    };
    NaiveDate::parse_from_str(date_part, format).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_iso_dates() {
        assert_eq!(parse_date("2022-01-27"), ymd(2022, 1, 27));
        assert_eq!(parse_date("2022-01-27 00:00:00"), ymd(2022, 1, 27));
        assert_eq!(parse_date("2022-01-27T00:00:00"), ymd(2022, 1, 27));
        assert_eq!(parse_date(" 2022-05-24 "), ymd(2022, 5, 24));
    }

    #[test]
    fn test_us_dates() {
        assert_eq!(parse_date("01/27/2022"), ymd(2022, 1, 27));
        assert_eq!(parse_date("1/27/2022"), ymd(2022, 1, 27));
        assert_eq!(parse_date("01/27/22"), ymd(2022, 1, 27));
        assert_eq!(parse_date("05-24-22"), ymd(2022, 5, 24));
        assert_eq!(parse_date("05-24-2022"), ymd(2022, 5, 24));
    }

    #[test]
    fn test_other_spellings() {
        assert_eq!(parse_date("2022/08/25"), ymd(2022, 8, 25));
        assert_eq!(parse_date("2022/08/25 00:00:00"), ymd(2022, 8, 25));
        assert_eq!(parse_date("Aug 25, 2022"), ymd(2022, 8, 25));
        assert_eq!(parse_date("August 25, 2022"), ymd(2022, 8, 25));
        assert_eq!(parse_date("25 August 2022"), ymd(2022, 8, 25));
    }

    #[test]
    fn test_rejected_dates() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("someday"), None);
        assert_eq!(parse_date("2022-13-01"), None);
        assert_eq!(parse_date("02/30/2022"), None);
        assert_eq!(parse_date("2022/01"), None);
    }
}
