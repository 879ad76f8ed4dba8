//! Subcommands and the state they share.

pub mod analytics;
pub mod batch;
pub mod categories;
pub mod config;
pub mod extract;
pub mod import;
pub mod transactions;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use fintrack_core::models::config::OcrConfig;
use fintrack_core::{
    Clock, FintrackConfig, FixedClock, PureOcrEngine, ReceiptKind, ReceiptReader, ReceiptUpload,
    SqliteStore, SystemClock, TextRecognizer,
};

/// Output format for records and extraction results.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

/// Global options resolved once per invocation.
pub struct Context {
    config_path: Option<PathBuf>,
    db_path: Option<PathBuf>,
    pub user_id: i64,
}

impl Context {
    pub fn new(config_path: Option<PathBuf>, db_path: Option<PathBuf>, user_id: i64) -> Self {
        Self {
            config_path,
            db_path,
            user_id,
        }
    }

    /// The config file in use: `--config`, or the per-user default.
    pub fn config_path(&self) -> PathBuf {
        self.config_path.clone().unwrap_or_else(default_config_path)
    }

    /// Load the configuration, falling back to defaults when no file exists.
    pub fn load_config(&self) -> anyhow::Result<FintrackConfig> {
        let path = self.config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            FintrackConfig::from_file(&path)
                .with_context(|| format!("Failed to read config {}", path.display()))
        } else if self.config_path.is_some() {
            anyhow::bail!("Config file not found: {}", path.display())
        } else {
            Ok(FintrackConfig::default())
        }
    }

    /// The database file: `--db`, or the configured path under the data directory.
    pub fn database_path(&self, config: &FintrackConfig) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| resolve_data_path(&config.store.database_path))
    }

    pub fn open_store(&self, config: &FintrackConfig) -> anyhow::Result<SqliteStore> {
        let path = self.database_path(config);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        SqliteStore::open(&path)
            .with_context(|| format!("Failed to open database {}", path.display()))
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fintrack")
        .join("config.json")
}

pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fintrack")
}

/// Relative paths in the config live under the data directory.
pub fn resolve_data_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        data_dir().join(path)
    }
}

/// Clock pinned to `today` when given.
pub fn clock(today: Option<NaiveDate>) -> Box<dyn Clock> {
    match today {
        Some(date) => Box::new(FixedClock(date)),
        None => Box::new(SystemClock),
    }
}

/// Load the OCR models if they are installed.
pub fn load_recognizer(config: &OcrConfig) -> Option<PureOcrEngine> {
    let config = OcrConfig {
        model_dir: resolve_data_path(&config.model_dir),
        ..config.clone()
    };

    if !config.models_present() {
        warn!(
            "OCR models not found at {}; images cannot be read",
            config.model_dir.display()
        );
        return None;
    }

    match PureOcrEngine::from_config(config) {
        Ok(engine) => Some(engine),
        Err(e) => {
            warn!("Failed to load OCR models: {}", e);
            None
        }
    }
}

/// Open a receipt file, or read receipt text from stdin when `input` is `-`.
pub fn open_upload(input: &str) -> anyhow::Result<ReceiptUpload> {
    if input == "-" {
        let mut data = Vec::new();
        std::io::stdin().read_to_end(&mut data)?;
        return Ok(ReceiptUpload {
            file_name: "stdin".to_string(),
            kind: ReceiptKind::Text,
            data,
        });
    }

    let path = Path::new(input);
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    Ok(ReceiptUpload::from_path(path)?)
}

/// Recover the raw text of `upload`, loading OCR only when it is needed.
pub fn read_receipt_text(
    upload: &ReceiptUpload,
    config: &FintrackConfig,
    recognizer: Option<&dyn TextRecognizer>,
) -> anyhow::Result<String> {
    let mut reader = ReceiptReader::new(config.upload.clone());
    if let Some(recognizer) = recognizer {
        reader = reader.with_recognizer(recognizer);
    }

    info!("Reading receipt {}", upload.file_name);
    reader
        .read_text(upload)
        .with_context(|| format!("Processing failed for {}", upload.file_name))
}

/// Whether reading `kind` may need OCR.
pub fn needs_ocr(kind: ReceiptKind) -> bool {
    !matches!(kind, ReceiptKind::Text)
}
