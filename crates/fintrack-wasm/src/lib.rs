//! WASM bindings for receipt field extraction.
//!
//! Lets a browser pre-fill the transaction form from OCR text without a
//! round trip to the server.

use chrono::NaiveDate;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use fintrack_core::receipt::rules::parse_dollar_amount;
use fintrack_core::{
    AmountSource, Clock, DateSource, ExtractedFields, FixedClock, ReceiptExtraction,
    ReceiptExtractor,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Today's date in the browser's time zone.
struct BrowserClock;

impl Clock for BrowserClock {
    fn today(&self) -> NaiveDate {
        let now = js_sys::Date::new_0();
        NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
            .unwrap_or_default()
    }
}

fn parse_today(today: &str) -> Result<NaiveDate, JsValue> {
    NaiveDate::parse_from_str(today.trim(), "%Y-%m-%d")
        .map_err(|e| JsValue::from_str(&format!("invalid date '{}': {}", today, e)))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn extract(text: &str, today: Option<&str>) -> Result<ReceiptExtraction, JsValue> {
    Ok(match today {
        Some(today) => ReceiptExtractor::with_clock(FixedClock(parse_today(today)?)).extract(text),
        None => ReceiptExtractor::with_clock(BrowserClock).extract(text),
    })
}

/// Extract receipt fields from recognized text.
///
/// Dates missing from the receipt default to the browser's today.
#[wasm_bindgen]
pub fn extract_fields(text: &str) -> Result<JsValue, JsValue> {
    to_js(&extract(text, None)?.fields)
}

/// Extract receipt fields, defaulting the date to `today` (`YYYY-MM-DD`).
#[wasm_bindgen]
pub fn extract_fields_on(text: &str, today: &str) -> Result<JsValue, JsValue> {
    to_js(&extract(text, Some(today))?.fields)
}

/// Extraction provenance for the review screen.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractionDetails {
    fields: ExtractedFields,
    candidates: Vec<String>,
    amount_source: &'static str,
    total_line: Option<String>,
    date_source: &'static str,
    date_text: Option<String>,
    warnings: Vec<String>,
}

impl From<ReceiptExtraction> for ExtractionDetails {
    fn from(extraction: ReceiptExtraction) -> Self {
        let (amount_source, total_line) = match extraction.amount_source {
            AmountSource::Labeled { line } => ("labeled", Some(line)),
            AmountSource::Summed { .. } => ("summed", None),
            AmountSource::Overflowed { .. } => ("overflowed", None),
            AmountSource::NotFound => ("notFound", None),
        };
        let (date_source, date_text) = match extraction.date_source {
            DateSource::Parsed { text } => ("parsed", Some(text)),
            DateSource::Unparsable { text } => ("unparsable", Some(text)),
            DateSource::Defaulted => ("defaulted", None),
        };

        Self {
            fields: extraction.fields,
            candidates: extraction.candidates.iter().map(|c| c.to_string()).collect(),
            amount_source,
            total_line,
            date_source,
            date_text,
            warnings: extraction.warnings,
        }
    }
}

/// Extract receipt fields together with how each was chosen.
///
/// `today` pins the default date; pass `undefined` to use the browser's.
#[wasm_bindgen]
pub fn extract_with_details(text: &str, today: Option<String>) -> Result<JsValue, JsValue> {
    let details = ExtractionDetails::from(extract(text, today.as_deref())?);
    to_js(&details)
}

/// Parse a dollar amount such as "$1,234.56" or ".75".
#[wasm_bindgen]
pub fn parse_amount(token: &str) -> Option<String> {
    let token = token.trim();
    parse_dollar_amount(token.strip_prefix('$').unwrap_or(token)).map(|d| d.to_string())
}

/// Receipt extractor with an optional pinned date, for repeated use.
#[wasm_bindgen]
pub struct ReceiptFieldExtractor {
    today: Option<NaiveDate>,
}

#[wasm_bindgen]
impl ReceiptFieldExtractor {
    /// Create an extractor; `today` (`YYYY-MM-DD`) pins the default date.
    #[wasm_bindgen(constructor)]
    pub fn new(today: Option<String>) -> Result<ReceiptFieldExtractor, JsValue> {
        let today = today.as_deref().map(parse_today).transpose()?;
        Ok(Self { today })
    }

    /// Extract receipt fields from text.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        let fields = match self.today {
            Some(today) => ReceiptExtractor::with_clock(FixedClock(today)).extract_fields(text),
            None => ReceiptExtractor::with_clock(BrowserClock).extract_fields(text),
        };
        to_js(&fields)
    }
}
