//! Configuration structures for fintrack.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for fintrack.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FintrackConfig {
    /// Receipt upload handling.
    pub upload: UploadConfig,

    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Transaction store configuration.
    pub store: StoreConfig,

    /// Transaction listing defaults.
    pub listing: ListingConfig,
}

/// Receipt upload configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Largest accepted receipt file in bytes.
    pub max_file_size: usize,

    /// Use text embedded in a PDF before trying OCR on its images.
    pub prefer_embedded_text: bool,

    /// Embedded PDF text shorter than this counts as a scanned PDF.
    pub min_text_length: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: 5 * 1024 * 1024,
            prefer_embedded_text: true,
            min_text_length: 20,
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep `[UNK]` markers for characters the model cannot map.
    pub keep_unknown: bool,

    /// Boxes whose top edges are within this many pixels share a line.
    pub line_tolerance: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            keep_unknown: false,
            line_tolerance: 20.0,
        }
    }
}

impl OcrConfig {
    /// Whether the detection and recognition models are on disk.
    pub fn models_present(&self) -> bool {
        self.model_dir.join(&self.detection_model).exists()
            && self.model_dir.join(&self.recognition_model).exists()
            && self.model_dir.join(&self.dictionary).exists()
    }
}

/// Transaction store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file.
    pub database_path: PathBuf,

    /// Directory imported receipt files are copied into.
    pub receipt_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("fintrack.db"),
            receipt_dir: PathBuf::from("uploads"),
        }
    }
}

/// Listing defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Transactions per page when not given.
    pub page_size: u32,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

impl FintrackConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: FintrackConfig =
            serde_json::from_str(r#"{"upload": {"max_file_size": 1024}}"#).unwrap();

        assert_eq!(config.upload.max_file_size, 1024);
        assert!(config.upload.prefer_embedded_text);
        assert_eq!(config.listing.page_size, 10);
        assert_eq!(config.ocr.detection_model, "det.onnx");
    }
}
