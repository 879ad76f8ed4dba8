//! Receipt field extraction module.

mod extractor;
pub mod rules;

pub use extractor::{
    extract_fields, AmountSource, DateSource, ReceiptExtraction, ReceiptExtractor,
};

use crate::models::fields::ExtractedFields;

/// Trait for receipt field extractors.
///
/// Implementations are total: any string, including an empty one, yields
/// fully populated fields.
pub trait FieldsExtractor {
    /// Propose transaction fields from raw recognized text.
    fn extract_fields(&self, raw_text: &str) -> ExtractedFields;
}
