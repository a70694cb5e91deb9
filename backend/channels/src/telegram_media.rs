//! Telegram Media Handler
//!
//! Picks the screenshot out of an incoming message and downloads it from the
//! Telegram file API.

use async_trait::async_trait;
use spamshot_core::{FetchedImage, FileRef, ImageSource, SpamshotError};
use teloxide::prelude::*;
use teloxide::types::{Document, PhotoSize};
use tracing::{debug, info};

/// Document types accepted as screenshots.
pub const ACCEPTED_DOCUMENT_TYPES: [&str; 3] = ["image/jpg", "image/jpeg", "image/png"];

/// The image attached to `msg`, if it carries one we can process.
pub fn screenshot_file(msg: &Message) -> Option<FileRef> {
    if let Some(sizes) = msg.photo() {
        return largest_photo(sizes);
    }
    msg.document().and_then(accepted_document)
}

fn largest_photo(sizes: &[PhotoSize]) -> Option<FileRef> {
    let largest = sizes
        .iter()
        .max_by_key(|p| u64::from(p.width) * u64::from(p.height))?;
    Some(FileRef {
        file_id: largest.file.id.to_string(),
        extension: None,
    })
}

fn accepted_document(doc: &Document) -> Option<FileRef> {
    let mime = doc.mime_type.as_ref()?;
    if !is_accepted_type(mime.essence_str()) {
        debug!(mime = %mime, "Ignoring document");
        return None;
    }
    // The file name is whatever the sender chose; the download path decides.
    Some(FileRef {
        file_id: doc.file.id.to_string(),
        extension: None,
    })
}

pub fn is_accepted_type(mime: &str) -> bool {
    ACCEPTED_DOCUMENT_TYPES
        .iter()
        .any(|accepted| accepted.eq_ignore_ascii_case(mime))
}

/// Lowercased extension of a file name or path, when it has one.
pub fn extension_of(name: &str) -> Option<String> {
    let file_name = name.rsplit('/').next().unwrap_or(name);
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Downloads submitted files through the bot's file API.
pub struct TelegramFileSource {
    bot: Bot,
    http: reqwest::Client,
}

impl TelegramFileSource {
    pub fn new(bot: Bot) -> Self {
        Self {
            bot,
            http: reqwest::Client::new(),
        }
    }

    fn download_url(&self, file_path: &str) -> String {
        format!(
            "{}/file/bot{}/{}",
            self.bot.api_url().as_str().trim_end_matches('/'),
            self.bot.token(),
            file_path
        )
    }
}

#[async_trait]
impl ImageSource for TelegramFileSource {
    async fn fetch(&self, file: &FileRef) -> Result<FetchedImage, SpamshotError> {
        let meta = self
            .bot
            .get_file(file.file_id.clone())
            .await
            .map_err(|e| SpamshotError::Download(format!("get_file: {e}")))?;

        let response = self
            .http
            .get(self.download_url(&meta.path))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| SpamshotError::Download(e.without_url().to_string()))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SpamshotError::Download(e.without_url().to_string()))?;

        info!(file_id = %file.file_id, bytes = bytes.len(), "Downloaded Telegram file");
        Ok(FetchedImage {
            bytes: bytes.to_vec(),
            extension: extension_of(&meta.path).unwrap_or_else(|| "jpg".to_string()),
        })
    }
}
