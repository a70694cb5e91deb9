use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recognized text fragment from the OCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrToken {
    pub text: String,
    /// 0–100; structural rows from Tesseract carry -1.
    pub confidence: f32,
    /// Engine grouping id: tokens sharing it belong to one visual line/block.
    pub block_id: i64,
}

impl OcrToken {
    pub fn new(text: impl Into<String>, confidence: f32, block_id: i64) -> Self {
        Self {
            text: text.into(),
            confidence,
            block_id,
        }
    }
}

/// Everything the OCR engine returned for one image.
#[derive(Debug, Clone, Default)]
pub struct OcrOutput {
    /// Raw engine output, kept as evidence alongside the report.
    pub raw: String,
    pub tokens: Vec<OcrToken>,
}

/// Outcome of the extraction stages for one screenshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub sender_number: Option<String>,
    /// Sender first, then every number quoted in the body. Duplicates allowed.
    pub all_numbers: Vec<String>,
    pub cleaned_text: String,
}

/// Opaque reference to a remote image (e.g. a Telegram `file_id`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub file_id: String,
    /// Extension hint used when the source cannot tell ("jpg", "png").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

/// The end user who submitted a screenshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submitter {
    pub user_id: i64,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    /// Full transport payload describing the user.
    pub raw: serde_json::Value,
}

impl Submitter {
    /// Name used in stored media file names.
    pub fn handle(&self) -> String {
        self.username
            .clone()
            .unwrap_or_else(|| self.user_id.to_string())
    }
}

/// The transport message that carried the screenshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceivedMessage {
    pub message_id: i64,
    pub user_id: i64,
    pub raw: serde_json::Value,
}

/// Evidence row linking a spammer number to a submitted screenshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpammerMessage {
    pub spammer_id: String,
    pub user_id: i64,
    pub ocr_raw: String,
    pub ocr_text: String,
    pub file_id: String,
    pub file_path: String,
    pub created_at: DateTime<Utc>,
}
