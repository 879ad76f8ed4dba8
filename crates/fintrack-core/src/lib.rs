//! Core library for the fintrack personal finance tracker.
//!
//! This crate provides:
//! - Receipt field extraction (total amount, transaction date) from raw text
//! - Receipt intake (PDF text and image extraction, OCR)
//! - The transaction ledger and category catalogue (SQLite)
//! - Income and spending analytics

pub mod analytics;
pub mod clock;
pub mod error;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod receipt;
pub mod store;
pub mod upload;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{FintrackError, Result};
pub use models::{
    Category, ExtractedFields, FintrackConfig, NewTransaction, Page, PageRequest, ReviewEdits,
    Transaction, TransactionFilter, TransactionType,
};
pub use ocr::{OcrResult, TextBox, TextRecognizer};
pub use pdf::{PdfExtractor, PdfProcessor};
pub use receipt::{
    extract_fields, AmountSource, DateSource, FieldsExtractor, ReceiptExtraction,
    ReceiptExtractor,
};
pub use store::{CategoryStore, TransactionStore};
pub use upload::{process_receipt, ProcessedReceipt, ReceiptKind, ReceiptReader, ReceiptUpload};

#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;

#[cfg(feature = "store")]
pub use store::SqliteStore;
