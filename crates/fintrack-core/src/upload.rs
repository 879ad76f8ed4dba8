//! Receipt intake: validate an uploaded file and recover its raw text.
//!
//! Failures here are "processing failed" conditions and are reported as
//! errors. An upload that yields no text is not a failure; the extractor
//! degrades it to default fields.

use std::fmt;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{OcrError, Result, UploadError};
use crate::models::config::UploadConfig;
use crate::models::fields::ExtractedFields;
use crate::ocr::TextRecognizer;
use crate::pdf::{PdfExtractor, PdfProcessor};
use crate::receipt::FieldsExtractor;

/// Kind of receipt file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptKind {
    /// PDF with embedded text, scanned pages, or both.
    Pdf,
    /// Photo or scan.
    Image,
    /// Text that was already recognized elsewhere.
    Text,
}

impl ReceiptKind {
    /// Detect the kind from a MIME type such as `image/png`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_lowercase();
        if mime == "application/pdf" {
            Some(Self::Pdf)
        } else if mime.starts_with("image/") {
            Some(Self::Image)
        } else if mime.starts_with("text/plain") {
            Some(Self::Text)
        } else {
            None
        }
    }

    /// Detect the kind from a file extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "png" | "jpg" | "jpeg" | "webp" | "tiff" | "tif" | "bmp" | "gif" => Some(Self::Image),
            "txt" | "text" => Some(Self::Text),
            _ => None,
        }
    }
}

impl fmt::Display for ReceiptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => f.write_str("pdf"),
            Self::Image => f.write_str("image"),
            Self::Text => f.write_str("text"),
        }
    }
}

/// An uploaded receipt file held in memory.
#[derive(Debug, Clone)]
pub struct ReceiptUpload {
    pub file_name: String,
    pub kind: ReceiptKind,
    pub data: Vec<u8>,
}

impl ReceiptUpload {
    /// Wrap bytes whose type is given by MIME type.
    pub fn from_mime(
        file_name: impl Into<String>,
        mime: &str,
        data: Vec<u8>,
    ) -> std::result::Result<Self, UploadError> {
        let kind = ReceiptKind::from_mime(mime)
            .ok_or_else(|| UploadError::UnsupportedFormat(mime.to_string()))?;
        Ok(Self {
            file_name: file_name.into(),
            kind,
            data,
        })
    }

    /// Read a receipt file, typed by its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        let kind = ReceiptKind::from_extension(&extension)
            .ok_or_else(|| UploadError::UnsupportedFormat(extension.clone()))?;

        let data = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            file_name,
            kind,
            data,
        })
    }

    /// Check the upload against the configured limits.
    pub fn validate(&self, config: &UploadConfig) -> std::result::Result<(), UploadError> {
        if self.data.is_empty() {
            return Err(UploadError::Empty);
        }
        if self.data.len() > config.max_file_size {
            return Err(UploadError::TooLarge {
                size: self.data.len(),
                limit: config.max_file_size,
            });
        }
        Ok(())
    }
}

/// Recovers raw text from receipt uploads.
pub struct ReceiptReader<'a> {
    config: UploadConfig,
    recognizer: Option<&'a dyn TextRecognizer>,
}

impl<'a> ReceiptReader<'a> {
    /// Create a reader without OCR; image receipts will be rejected.
    pub fn new(config: UploadConfig) -> Self {
        Self {
            config,
            recognizer: None,
        }
    }

    /// Use `recognizer` for images and scanned PDFs.
    pub fn with_recognizer(mut self, recognizer: &'a dyn TextRecognizer) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Validate `upload` and return its raw text (possibly empty).
    pub fn read_text(&self, upload: &ReceiptUpload) -> Result<String> {
        upload.validate(&self.config)?;

        info!(
            "Reading {} receipt {} ({} bytes)",
            upload.kind,
            upload.file_name,
            upload.data.len()
        );

        let text = match upload.kind {
            ReceiptKind::Text => String::from_utf8_lossy(&upload.data).into_owned(),
            ReceiptKind::Image => {
                let recognizer = self.recognizer.ok_or(OcrError::Unavailable)?;
                let image = image::load_from_memory(&upload.data)?;
                recognizer.recognize(&image)?.text
            }
            ReceiptKind::Pdf => self.read_pdf(&upload.data)?,
        };

        debug!("Recovered {} characters of text", text.len());
        Ok(text)
    }

    fn read_pdf(&self, data: &[u8]) -> Result<String> {
        let mut extractor = PdfExtractor::new();
        extractor.load(data)?;
        debug!("PDF has {} pages", extractor.page_count());

        let embedded = if self.config.prefer_embedded_text || self.recognizer.is_none() {
            extractor.extract_text()?
        } else {
            String::new()
        };

        if embedded.trim().len() >= self.config.min_text_length {
            return Ok(embedded);
        }

        let Some(recognizer) = self.recognizer else {
            return Ok(embedded);
        };

        let images = extractor.extract_images()?;
        if images.is_empty() {
            debug!("No scanned pages to OCR");
            return Ok(embedded);
        }

        let mut pages = Vec::with_capacity(images.len());
        for (i, image) in images.iter().enumerate() {
            match recognizer.recognize(image) {
                Ok(result) if !result.text.trim().is_empty() => pages.push(result.text),
                Ok(_) => debug!("No text detected in image {}", i + 1),
                Err(e) => warn!("OCR failed for image {}: {}", i + 1, e),
            }
        }

        if pages.is_empty() {
            Ok(embedded)
        } else {
            Ok(pages.join("\n\n"))
        }
    }
}

/// A processed upload ready for review.
#[derive(Debug, Clone)]
pub struct ProcessedReceipt {
    pub raw_text: String,
    pub fields: ExtractedFields,
}

/// Read `upload` and propose fields from its text.
pub fn process_receipt(
    reader: &ReceiptReader<'_>,
    extractor: &impl FieldsExtractor,
    upload: &ReceiptUpload,
) -> Result<ProcessedReceipt> {
    let raw_text = reader.read_text(upload)?;
    let fields = extractor.extract_fields(&raw_text);
    Ok(ProcessedReceipt { raw_text, fields })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::FintrackError;
    use crate::ocr::{OcrResult, TextBox};
    use crate::receipt::ReceiptExtractor;
    use chrono::NaiveDate;
    use image::{DynamicImage, RgbImage};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::io::Cursor;

    struct CannedRecognizer(&'static str);

    impl TextRecognizer for CannedRecognizer {
        fn recognize(&self, _image: &DynamicImage) -> std::result::Result<OcrResult, OcrError> {
            let boxes = self
                .0
                .lines()
                .enumerate()
                .map(|(i, line)| {
                    let y = i as f32 * 40.0;
                    TextBox {
                        bbox: [0.0, y, 100.0, y, 100.0, y + 20.0, 0.0, y + 20.0],
                        text: line.to_string(),
                        confidence: 1.0,
                    }
                })
                .collect();
            Ok(OcrResult::from_boxes(boxes, 10.0))
        }
    }

    fn png_bytes() -> Vec<u8> {
        let mut data = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(4, 4))
            .write_to(&mut Cursor::new(&mut data), image::ImageFormat::Png)
            .unwrap();
        data
    }

    #[test]
    fn test_kind_detection() {
        assert_eq!(ReceiptKind::from_mime("application/pdf"), Some(ReceiptKind::Pdf));
        assert_eq!(ReceiptKind::from_mime("image/jpeg"), Some(ReceiptKind::Image));
        assert_eq!(ReceiptKind::from_mime("text/plain; charset=utf-8"), Some(ReceiptKind::Text));
        assert_eq!(ReceiptKind::from_mime("application/zip"), None);
        assert_eq!(ReceiptKind::from_extension("JPG"), Some(ReceiptKind::Image));
        assert_eq!(ReceiptKind::from_extension("docx"), None);
    }

    #[test]
    fn test_unsupported_mime() {
        let result = ReceiptUpload::from_mime("a.zip", "application/zip", vec![1]);
        assert!(matches!(result, Err(UploadError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_size_limit() {
        let config = UploadConfig {
            max_file_size: 4,
            ..Default::default()
        };
        let upload = ReceiptUpload::from_mime("r.txt", "text/plain", b"12345".to_vec()).unwrap();

        let err = ReceiptReader::new(config).read_text(&upload).unwrap_err();
        assert!(matches!(
            err,
            FintrackError::Upload(UploadError::TooLarge { size: 5, limit: 4 })
        ));
    }

    #[test]
    fn test_empty_upload() {
        let upload = ReceiptUpload::from_mime("r.txt", "text/plain", Vec::new()).unwrap();
        let err = ReceiptReader::new(UploadConfig::default()).read_text(&upload).unwrap_err();
        assert!(matches!(err, FintrackError::Upload(UploadError::Empty)));
    }

    #[test]
    fn test_image_needs_recognizer() {
        let upload = ReceiptUpload::from_mime("r.png", "image/png", png_bytes()).unwrap();
        let err = ReceiptReader::new(UploadConfig::default()).read_text(&upload).unwrap_err();
        assert!(matches!(err, FintrackError::Ocr(OcrError::Unavailable)));
    }

    #[test]
    fn test_image_through_recognizer() {
        let recognizer = CannedRecognizer("SHOP\nTotal $9.99\nMay 1, 2024");
        let reader = ReceiptReader::new(UploadConfig::default()).with_recognizer(&recognizer);
        let upload = ReceiptUpload::from_mime("r.png", "image/png", png_bytes()).unwrap();

        let text = reader.read_text(&upload).unwrap();
        assert_eq!(text, "SHOP\nTotal $9.99\nMay 1, 2024");
    }

    #[test]
    fn test_process_receipt_text() {
        let reader = ReceiptReader::new(UploadConfig::default());
        let extractor =
            ReceiptExtractor::with_clock(FixedClock(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));
        let upload = ReceiptUpload::from_mime(
            "r.txt",
            "text/plain",
            b"Coffee $3.00\nMuffin $2.50".to_vec(),
        )
        .unwrap();

        let processed = process_receipt(&reader, &extractor, &upload).unwrap();
        assert_eq!(processed.raw_text, "Coffee $3.00\nMuffin $2.50");
        assert_eq!(processed.fields.total_amount, Some(Decimal::new(550, 2)));
        assert_eq!(
            processed.fields.transaction_date,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
    }

    #[test]
    fn test_bad_pdf_is_processing_failure() {
        let upload = ReceiptUpload::from_mime("r.pdf", "application/pdf", b"%PDF-garbage".to_vec())
            .unwrap();
        let err = ReceiptReader::new(UploadConfig::default()).read_text(&upload).unwrap_err();
        assert!(matches!(err, FintrackError::Pdf(_)));
    }
}
