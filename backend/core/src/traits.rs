use std::path::Path;

use async_trait::async_trait;

use crate::error::SpamshotError;
use crate::types::{FileRef, OcrOutput, ReceivedMessage, SpammerMessage, Submitter};

/// Raw bytes of a downloaded image plus the extension it was served with.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub extension: String,
}

/// Resolves an opaque file reference to image bytes over the network.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, file: &FileRef) -> Result<FetchedImage, SpamshotError>;
}

/// Turns an image on disk into a token table.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Engine name for logging (e.g. "tesseract").
    fn name(&self) -> &str;

    async fn recognize(&self, image_path: &Path) -> Result<OcrOutput, SpamshotError>;
}

/// Maps a raw phone match to the key used for persistence.
///
/// Must be deterministic and total over any string the phone pattern matches.
pub trait PhoneCanonicalizer: Send + Sync {
    fn canonicalize(&self, raw: &str) -> String;
}

/// Persistence for submitters, their messages, and reported spammers.
#[async_trait]
pub trait SpamStore: Send + Sync {
    /// Insert the submitter, or refresh the stored profile if already known.
    async fn upsert_user(&self, user: &Submitter) -> Result<(), SpamshotError>;

    async fn log_message(&self, message: &ReceivedMessage) -> Result<(), SpamshotError>;

    async fn spammer_exists(&self, phone_number: &str) -> Result<bool, SpamshotError>;

    async fn insert_spammer(&self, phone_number: &str) -> Result<(), SpamshotError>;

    async fn insert_spammer_message(&self, record: &SpammerMessage) -> Result<(), SpamshotError>;
}

/// Edits the pending status message visible to the submitter.
#[async_trait]
pub trait ProgressNotifier: Send + Sync {
    async fn update(&self, text: &str) -> Result<(), SpamshotError>;
}
