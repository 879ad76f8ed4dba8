use wasm_bindgen_test::*;

use fintrack_core::ExtractedFields;
use fintrack_wasm::{extract_fields_on, extract_with_details, parse_amount, version, ReceiptFieldExtractor};

#[wasm_bindgen_test]
fn reports_version() {
    assert_eq!(version(), env!("CARGO_PKG_VERSION"));
}

#[wasm_bindgen_test]
fn extracts_labeled_total() {
    let value = extract_fields_on("Item $15.00\nTotal $50.00\nMay 1, 2024", "2024-06-01").unwrap();
    let fields: ExtractedFields = serde_wasm_bindgen::from_value(value).unwrap();

    assert_eq!(fields.total_amount.map(|a| a.to_string()), Some("50.00".to_string()));
    assert_eq!(fields.transaction_date.to_string(), "2024-05-01");
    assert_eq!(fields.description, "Imported from receipt");
}

#[wasm_bindgen_test]
fn empty_text_defaults_to_pinned_day() {
    let value = extract_fields_on("", "2024-06-01").unwrap();
    let fields: ExtractedFields = serde_wasm_bindgen::from_value(value).unwrap();

    assert_eq!(fields.total_amount, None);
    assert_eq!(fields.transaction_date.to_string(), "2024-06-01");
}

#[wasm_bindgen_test]
fn rejects_bad_pinned_day() {
    assert!(extract_fields_on("Total $1.00", "June 1").is_err());
    assert!(ReceiptFieldExtractor::new(Some("2024-13-01".to_string())).is_err());
}

#[wasm_bindgen_test]
fn details_are_serializable() {
    let value = extract_with_details("Coffee $3.00\nMuffin $2.50", Some("2024-06-01".to_string()));
    assert!(value.is_ok());
}

#[wasm_bindgen_test]
fn parses_amount_tokens() {
    assert_eq!(parse_amount("$1,234.56").as_deref(), Some("1234.56"));
    assert_eq!(parse_amount(".75").as_deref(), Some("0.75"));
    assert_eq!(parse_amount("$"), None);
}
