//! Date extraction for receipts.

use chrono::NaiveDate;

use super::patterns::DATE_MONTH_NAME;
use super::ExtractionMatch;

/// Outcome of looking for the receipt date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateLookup {
    /// First date-shaped text parsed to a calendar date.
    Parsed(ExtractionMatch<NaiveDate>),
    /// First date-shaped text is not a real date.
    Unparsable(String),
    /// No date-shaped text at all.
    Missing,
}

impl DateLookup {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Parsed(found) => Some(found.value),
            _ => None,
        }
    }
}

/// Look at the first date-shaped substring only.
///
/// An invalid first match is reported rather than skipped in favour of a
/// later one.
pub fn find_receipt_date(text: &str) -> DateLookup {
    let Some(caps) = DATE_MONTH_NAME.captures(text) else {
        return DateLookup::Missing;
    };

    let Some(full_match) = caps.get(0) else {
        return DateLookup::Missing;
    };
    match date_from_parts(&caps[1], &caps[2], &caps[3]) {
        Some(date) => DateLookup::Parsed(
            ExtractionMatch::new(date, full_match.as_str())
                .with_position(full_match.start(), full_match.end()),
        ),
        None => DateLookup::Unparsable(full_match.as_str().to_string()),
    }
}

fn date_from_parts(month: &str, day: &str, year: &str) -> Option<NaiveDate> {
    let month = month_to_number(month)?;
    let day: u32 = day.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Map an English month name or abbreviation to its number.
pub fn month_to_number(month: &str) -> Option<u32> {
    let number = match month.to_lowercase().as_str() {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sept" | "sep" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(number)
}
