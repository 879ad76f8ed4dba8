//! Error types for the fintrack-core library.
//!
//! Receipt field extraction itself never fails; these errors belong to the
//! collaborators around it (file intake, OCR, PDF parsing, the ledger).

use thiserror::Error;

/// Main error type for the fintrack library.
#[derive(Error, Debug)]
pub enum FintrackError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Rejected receipt upload.
    #[error("upload error: {0}")]
    Upload(#[from] UploadError),

    /// Transaction store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Reviewed values that cannot become a transaction.
    #[error("invalid transaction: {0}")]
    Validation(#[from] ValidationError),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// No recognizer is configured for image receipts.
    #[error("no OCR engine configured")]
    Unavailable,

    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),
}

/// Errors raised while accepting an uploaded receipt file.
#[derive(Error, Debug)]
pub enum UploadError {
    /// The file exceeds the configured size limit.
    #[error("file is {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    /// Neither a PDF, an image nor plain text.
    #[error("unsupported receipt format: {0}")]
    UnsupportedFormat(String),

    /// The upload carried no bytes.
    #[error("no file uploaded")]
    Empty,
}

/// Errors from the transaction store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record with that id belongs to the user.
    #[error("not found")]
    NotFound,

    /// A stored value could not be decoded.
    #[error("corrupt {column} value: {value}")]
    Corrupt { column: &'static str, value: String },

    /// The record failed validation before it was written.
    #[error("invalid transaction: {0}")]
    Invalid(#[from] ValidationError),

    /// Underlying SQLite error.
    #[cfg(feature = "store")]
    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),
}

/// Reasons a reviewed receipt cannot be saved as a transaction.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// No total was extracted and none was entered.
    #[error("amount is required")]
    MissingAmount,

    /// Amounts are unsigned; the type carries the direction.
    #[error("amount must not be negative")]
    NegativeAmount,

    /// Above [`MAX_AMOUNT`](crate::models::MAX_AMOUNT).
    #[error("amount must not exceed 99,999,999.99")]
    AmountTooLarge,

    /// Category is required before saving.
    #[error("category is required")]
    MissingCategory,
}

/// Result type for the fintrack library.
pub type Result<T> = std::result::Result<T, FintrackError>;
