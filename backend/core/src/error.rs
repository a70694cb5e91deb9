use thiserror::Error;

/// Top-level error type for a Spamshot pipeline run.
///
/// Every variant is entry-local: the submission queue reports it to the
/// submitter that triggered it and moves on to the next entry.
#[derive(Debug, Error)]
pub enum SpamshotError {
    #[error("no phone number found in the top of the screenshot")]
    NoNumberFound,

    #[error("download failed: {0}")]
    Download(String),

    #[error("OCR engine error: {0}")]
    Ocr(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("progress notification failed: {0}")]
    Notify(String),

    #[error("run timed out after {0}s")]
    Timeout(u64),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SpamshotError {
    /// Short category name shown to the submitter next to the description.
    pub fn category(&self) -> &'static str {
        match self {
            SpamshotError::NoNumberFound => "NoNumberFound",
            SpamshotError::Download(_) => "DownloadError",
            SpamshotError::Ocr(_) => "OcrError",
            SpamshotError::Storage(_) => "StorageError",
            SpamshotError::Notify(_) => "NotifyError",
            SpamshotError::Timeout(_) => "TimeoutError",
            SpamshotError::Config(_) => "ConfigError",
            SpamshotError::Other(_) => "Error",
        }
    }

    /// Text sent to the submitter when their run fails.
    pub fn user_message(&self) -> String {
        match self {
            SpamshotError::NoNumberFound => {
                "can't find the phone number :/ try sending again (or send as file)".to_string()
            }
            other => format!("something went wrong...\n\n{}: {}", other.category(), other),
        }
    }
}
