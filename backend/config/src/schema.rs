//! Spamshot runtime configuration schema.
//!
//! Every section and field is optional in the file; [`crate::apply_all_defaults`]
//! fills in whatever was left out.

use serde::{Deserialize, Serialize};

use crate::defaults::*;

/// Root configuration, read from `config.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpamshotConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram: Option<TelegramConfig>,

    /// Tesseract invocation and token filtering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr: Option<OcrConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<QueueConfig>,

    /// Where images and the database live
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrConfig {
    /// Tesseract executable name or path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oem: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psm: Option<u8>,
    /// Tokens below this confidence (0-100) are discarded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionConfig {
    /// Share of lines, from the top, searched for the sender number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_window_ratio: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueConfig {
    /// Per-run time limit. `0` is rejected by validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

// Resolved accessors; each falls back to the built-in default.
impl SpamshotConfig {
    pub fn bot_token(&self) -> Option<&str> {
        self.telegram
            .as_ref()
            .and_then(|t| t.bot_token.as_deref())
            .filter(|t| !t.trim().is_empty())
    }

    pub fn ocr_command(&self) -> &str {
        self.ocr
            .as_ref()
            .and_then(|o| o.command.as_deref())
            .unwrap_or(DEFAULT_OCR_COMMAND)
    }

    pub fn ocr_lang(&self) -> &str {
        self.ocr
            .as_ref()
            .and_then(|o| o.lang.as_deref())
            .unwrap_or(DEFAULT_OCR_LANG)
    }

    pub fn ocr_oem(&self) -> u8 {
        self.ocr.as_ref().and_then(|o| o.oem).unwrap_or(DEFAULT_OCR_OEM)
    }

    pub fn ocr_psm(&self) -> u8 {
        self.ocr.as_ref().and_then(|o| o.psm).unwrap_or(DEFAULT_OCR_PSM)
    }

    pub fn min_confidence(&self) -> f32 {
        self.ocr
            .as_ref()
            .and_then(|o| o.min_confidence)
            .unwrap_or(DEFAULT_MIN_CONFIDENCE)
    }

    pub fn ocr_timeout_secs(&self) -> u64 {
        self.ocr
            .as_ref()
            .and_then(|o| o.timeout_secs)
            .unwrap_or(DEFAULT_OCR_TIMEOUT_SECS)
    }

    pub fn search_window_ratio(&self) -> f64 {
        self.extraction
            .as_ref()
            .and_then(|e| e.search_window_ratio)
            .unwrap_or(DEFAULT_SEARCH_WINDOW_RATIO)
    }

    pub fn run_timeout_secs(&self) -> u64 {
        self.queue
            .as_ref()
            .and_then(|q| q.run_timeout_secs)
            .unwrap_or(DEFAULT_RUN_TIMEOUT_SECS)
    }

    pub fn media_dir(&self) -> &str {
        self.storage
            .as_ref()
            .and_then(|s| s.media_dir.as_deref())
            .unwrap_or(DEFAULT_MEDIA_DIR)
    }

    pub fn db_path(&self) -> &str {
        self.storage
            .as_ref()
            .and_then(|s| s.db_path.as_deref())
            .unwrap_or(DEFAULT_DB_PATH)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.dir.as_deref())
            .unwrap_or(DEFAULT_LOG_DIR)
    }
}
