//! Receipt field extractor: raw text in, a reviewable candidate transaction out.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::models::fields::ExtractedFields;

use super::rules::{
    amounts::{resolve_total, AmountExtractor, TotalResolution},
    dates::{find_receipt_date, DateLookup},
    FieldExtractor,
};
use super::FieldsExtractor;

/// Where the extracted total came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountSource {
    /// First amount on the first total-labeled line.
    Labeled { line: String },
    /// Sum of all `count` dollar amounts.
    Summed { count: usize },
    /// The `count` amounts were too large to add up.
    Overflowed { count: usize },
    /// No dollar amount anywhere.
    NotFound,
}

/// Where the transaction date came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateSource {
    /// Parsed from `text`.
    Parsed { text: String },
    /// `text` looked like a date but is not one; today was used.
    Unparsable { text: String },
    /// Nothing looked like a date; today was used.
    Defaulted,
}

/// Extracted fields plus the reasoning behind them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptExtraction {
    /// Fields to pre-fill the review form with.
    pub fields: ExtractedFields,
    /// Every dollar amount, in text order.
    pub candidates: Vec<Decimal>,
    /// How `fields.total_amount` was chosen.
    pub amount_source: AmountSource,
    /// How `fields.transaction_date` was chosen.
    pub date_source: DateSource,
    /// Notes for the reviewer.
    pub warnings: Vec<String>,
}

/// Heuristic receipt parser over an injected clock.
pub struct ReceiptExtractor<C = SystemClock> {
    clock: C,
}

impl ReceiptExtractor<SystemClock> {
    /// Create an extractor that defaults dates to the local calendar day.
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl Default for ReceiptExtractor<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> ReceiptExtractor<C> {
    /// Create an extractor reading "today" from `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Run the full heuristic chain and keep its provenance.
    pub fn extract(&self, text: &str) -> ReceiptExtraction {
        let today = self.clock.today();
        let mut warnings = Vec::new();

        debug!("Extracting receipt fields from {} characters of text", text.len());

        let candidates = AmountExtractor::new().extract_all(text);
        let resolution = resolve_total(text, &candidates);

        let amount_source = match &resolution {
            TotalResolution::Labeled { line, .. } => AmountSource::Labeled { line: line.clone() },
            TotalResolution::Summed { count, .. } => {
                warnings.push(format!(
                    "No total line found; summed {} amounts, check for subtotals or tax",
                    count
                ));
                AmountSource::Summed { count: *count }
            }
            TotalResolution::Overflowed { count } => {
                warnings.push(format!(
                    "The {} amounts found are too large to add up; enter the total manually",
                    count
                ));
                AmountSource::Overflowed { count: *count }
            }
            TotalResolution::NotFound => {
                warnings.push("No dollar amounts found; enter the total manually".to_string());
                AmountSource::NotFound
            }
        };

        let (transaction_date, date_source) = resolve_date(find_receipt_date(text), today);
        match &date_source {
            DateSource::Parsed { .. } => {}
            DateSource::Unparsable { text } => {
                warnings.push(format!("\"{}\" is not a valid date; using {}", text, today));
            }
            DateSource::Defaulted => {
                warnings.push(format!("No date found; using {}", today));
            }
        }

        let fields = ExtractedFields {
            total_amount: resolution.amount(),
            transaction_date,
            ..ExtractedFields::empty(today)
        };

        debug!(
            "Extracted total {:?} ({:?}) dated {} ({:?})",
            fields.total_amount, amount_source, fields.transaction_date, date_source
        );

        ReceiptExtraction {
            fields,
            candidates: candidates.into_iter().map(|m| m.value).collect(),
            amount_source,
            date_source,
            warnings,
        }
    }

    /// Extract only the form fields.
    pub fn extract_fields(&self, text: &str) -> ExtractedFields {
        self.extract(text).fields
    }
}

impl<C: Clock> FieldsExtractor for ReceiptExtractor<C> {
    fn extract_fields(&self, raw_text: &str) -> ExtractedFields {
        self.extract(raw_text).fields
    }
}

fn resolve_date(lookup: DateLookup, today: NaiveDate) -> (NaiveDate, DateSource) {
    match lookup {
        DateLookup::Parsed(found) => (found.value, DateSource::Parsed { text: found.source }),
        DateLookup::Unparsable(text) => (today, DateSource::Unparsable { text }),
        DateLookup::Missing => (today, DateSource::Defaulted),
    }
}

/// Extract fields from `raw_text`, defaulting the date to `clock`'s today.
pub fn extract_fields(raw_text: &str, clock: &dyn Clock) -> ExtractedFields {
    ReceiptExtractor::with_clock(clock).extract_fields(raw_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::fields::{TransactionType, RECEIPT_DESCRIPTION};
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
    }

    fn extractor() -> ReceiptExtractor<FixedClock> {
        ReceiptExtractor::with_clock(FixedClock(today()))
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn assert_fixed_fields(fields: &ExtractedFields) {
        assert_eq!(fields.transaction_type, TransactionType::Expense);
        assert_eq!(fields.category, "");
        assert_eq!(fields.description, RECEIPT_DESCRIPTION);
    }

    #[test]
    fn test_labeled_total_beats_sum() {
        let text = r#"
            CORNER MARKET
            Apples        $10.00
            Bread          $5.00
            Total: $50.00
        "#;

        let result = extractor().extract(text);
        assert_eq!(result.fields.total_amount, Some(dec("50.00")));
        assert_eq!(
            result.amount_source,
            AmountSource::Labeled { line: "Total: $50.00".to_string() }
        );
        assert_eq!(result.candidates.len(), 3);
    }

    #[test]
    fn test_fallback_sum() {
        let text = "Sandwich $12.00\nSoup $8.50\nDrink $3.25";

        let result = extractor().extract(text);
        assert_eq!(result.fields.total_amount, Some(dec("23.75")));
        assert_eq!(result.amount_source, AmountSource::Summed { count: 3 });
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_no_amount_is_absent() {
        let fields = extractor().extract_fields("Thanks for visiting!\nSee you soon");
        assert_eq!(fields.total_amount, None);
        assert_fixed_fields(&fields);
    }

    #[test]
    fn test_date_parsed() {
        let fields = extractor().extract_fields("Receipt date: April 5, 2024\nTotal $3.00");
        assert_eq!(fields.transaction_date, NaiveDate::from_ymd_opt(2024, 4, 5).unwrap());
        assert_eq!(fields.transaction_date.to_string(), "2024-04-05");
    }

    #[test]
    fn test_date_defaults_to_clock() {
        let result = extractor().extract("Total $3.00\n2024-04-05");
        assert_eq!(result.fields.transaction_date, today());
        assert_eq!(result.date_source, DateSource::Defaulted);
    }

    #[test]
    fn test_invalid_date_defaults_to_clock() {
        let result = extractor().extract("April 31, 2024");
        assert_eq!(result.fields.transaction_date, today());
        assert_eq!(
            result.date_source,
            DateSource::Unparsable { text: "April 31, 2024".to_string() }
        );
    }

    #[test]
    fn test_comma_thousands() {
        let fields = extractor().extract_fields("Laptop $1,234.56");
        assert_eq!(fields.total_amount, Some(dec("1234.56")));
    }

    #[test]
    fn test_first_match_on_labeled_line() {
        let fields = extractor().extract_fields("Grand Total $40.00 (was $45.00)");
        assert_eq!(fields.total_amount, Some(dec("40.00")));
    }

    #[test]
    fn test_labeled_line_without_amount_falls_back_to_sum() {
        let text = "Total\n$4.00\n$6.00\nBalance due $99.00";
        let fields = extractor().extract_fields(text);
        assert_eq!(fields.total_amount, Some(dec("109.00")));
    }

    #[test]
    fn test_totality_on_odd_input() {
        let inputs = [
            "",
            "\n\n\n",
            "$",
            "$$$",
            "$,,,",
            "Total: $",
            "TOTAL $,",
            "no digits here at all",
            "December 99, 2024 $1.2.3",
            "日本語のレシート ¥1200",
            "Item $79,228,162,514,264,337,593,543,950,335\nItem $79,228,162,514,264,337,593,543,950,335",
            "Total $99999999999999999999999999999999999",
        ];

        for input in inputs {
            let fields = extractor().extract_fields(input);
            assert_fixed_fields(&fields);
        }
    }

    #[test]
    fn test_overflowing_sum_leaves_total_empty() {
        let max = "$79,228,162,514,264,337,593,543,950,335";
        let result = extractor().extract(&format!("Item {max}\nItem {max}"));

        assert_eq!(result.fields.total_amount, None);
        assert_eq!(result.amount_source, AmountSource::Overflowed { count: 2 });
        assert!(result.warnings.iter().any(|w| w.contains("too large")));
    }

    #[test]
    fn test_total_line_uses_its_first_token_only() {
        let result = extractor().extract("Item $3.00\nTotal $, $5.00");

        assert_eq!(result.amount_source, AmountSource::Summed { count: 2 });
        assert_eq!(result.fields.total_amount, Some(dec("8.00")));
    }

    #[test]
    fn test_malformed_tokens_do_not_block_others() {
        let fields = extractor().extract_fields("Fee $, \nItem $2.50");
        assert_eq!(fields.total_amount, Some(dec("2.50")));
    }

    #[test]
    fn test_deterministic() {
        let text = "Grand Total $40.00\nMarch 3, 2024";
        assert_eq!(extractor().extract(text), extractor().extract(text));
    }

    #[test]
    fn test_free_function_uses_given_clock() {
        let fields = extract_fields("", &FixedClock(today()));
        assert_eq!(fields, ExtractedFields::empty(today()));
    }
}
