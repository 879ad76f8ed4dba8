//! Common regex patterns for receipt extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Dollar amount: "$" then digits and thousands commas, one optional decimal part.
    // "$.50" is accepted; "$," matches but fails to parse later.
    pub static ref DOLLAR_AMOUNT: Regex = Regex::new(
        r"\$([\d,]+(?:\.\d+)?|\.\d+)"
    ).unwrap();

    // Lines announcing the authoritative total
    pub static ref TOTAL_LABEL: Regex = Regex::new(
        r"(?i)(?:grand total|amount due|balance due|amount payable|total)"
    ).unwrap();

    // Spelled-out month date: "April 5, 2024", "Sept 30, 2023"
    pub static ref DATE_MONTH_NAME: Regex = Regex::new(
        r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec) (\d{1,2}), (\d{4})\b"
    ).unwrap();
}
