//! Config defaults: fills every unset field with its built-in value.

use crate::schema::{
    ExtractionConfig, LoggingConfig, OcrConfig, QueueConfig, SpamshotConfig, StorageConfig,
};

/// Minimum token confidence on Tesseract's 0-100 scale, and the top share of
/// reconstructed lines searched for the sender. Owned by the extractor.
pub use spamshot_understanding::{
    DEFAULT_MIN_CONFIDENCE, DEFAULT_SEARCH_WINDOW as DEFAULT_SEARCH_WINDOW_RATIO,
};

pub const DEFAULT_OCR_COMMAND: &str = "tesseract";
pub const DEFAULT_OCR_LANG: &str = "eng";
pub const DEFAULT_OCR_OEM: u8 = 3;
pub const DEFAULT_OCR_PSM: u8 = 3;

pub const DEFAULT_OCR_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 300;

pub const DEFAULT_MEDIA_DIR: &str = "./storage/media";
pub const DEFAULT_DB_PATH: &str = "./storage/spamshot.db";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_DIR: &str = "./storage/logs";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: SpamshotConfig) -> SpamshotConfig {
    let config = apply_ocr_defaults(config);
    let config = apply_extraction_defaults(config);
    let config = apply_queue_defaults(config);
    let config = apply_storage_defaults(config);
    apply_logging_defaults(config)
}

fn apply_ocr_defaults(mut config: SpamshotConfig) -> SpamshotConfig {
    let ocr = config.ocr.get_or_insert_with(OcrConfig::default);
    ocr.command.get_or_insert_with(|| DEFAULT_OCR_COMMAND.to_string());
    ocr.lang.get_or_insert_with(|| DEFAULT_OCR_LANG.to_string());
    ocr.oem.get_or_insert(DEFAULT_OCR_OEM);
    ocr.psm.get_or_insert(DEFAULT_OCR_PSM);
    ocr.min_confidence.get_or_insert(DEFAULT_MIN_CONFIDENCE);
    ocr.timeout_secs.get_or_insert(DEFAULT_OCR_TIMEOUT_SECS);
    config
}

fn apply_extraction_defaults(mut config: SpamshotConfig) -> SpamshotConfig {
    let extraction = config.extraction.get_or_insert_with(ExtractionConfig::default);
    extraction
        .search_window_ratio
        .get_or_insert(DEFAULT_SEARCH_WINDOW_RATIO);
    config
}

fn apply_queue_defaults(mut config: SpamshotConfig) -> SpamshotConfig {
    let queue = config.queue.get_or_insert_with(QueueConfig::default);
    queue.run_timeout_secs.get_or_insert(DEFAULT_RUN_TIMEOUT_SECS);
    config
}

fn apply_storage_defaults(mut config: SpamshotConfig) -> SpamshotConfig {
    let storage = config.storage.get_or_insert_with(StorageConfig::default);
    storage.media_dir.get_or_insert_with(|| DEFAULT_MEDIA_DIR.to_string());
    storage.db_path.get_or_insert_with(|| DEFAULT_DB_PATH.to_string());
    config
}

fn apply_logging_defaults(mut config: SpamshotConfig) -> SpamshotConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.dir.get_or_insert_with(|| DEFAULT_LOG_DIR.to_string());
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_empty_config() {
        let config = apply_all_defaults(SpamshotConfig::default());
        let ocr = config.ocr.as_ref().unwrap();
        assert_eq!(ocr.command.as_deref(), Some("tesseract"));
        assert_eq!(ocr.min_confidence, Some(DEFAULT_MIN_CONFIDENCE));
        assert_eq!(config.queue.unwrap().run_timeout_secs, Some(300));
        assert_eq!(config.storage.unwrap().media_dir.as_deref(), Some("./storage/media"));
    }

    #[test]
    fn keeps_explicit_values() {
        let mut config = SpamshotConfig::default();
        config.ocr = Some(OcrConfig {
            psm: Some(6),
            ..Default::default()
        });
        let config = apply_all_defaults(config);
        let ocr = config.ocr.unwrap();
        assert_eq!(ocr.psm, Some(6));
        assert_eq!(ocr.oem, Some(DEFAULT_OCR_OEM));
    }

    #[test]
    fn extraction_defaults_match_extractor() {
        let config = apply_all_defaults(SpamshotConfig::default());
        let built = spamshot_understanding::ExtractionSettings::default();
        assert_eq!(config.ocr.unwrap().min_confidence, Some(built.min_confidence));
        assert_eq!(
            config.extraction.unwrap().search_window_ratio,
            Some(built.search_window)
        );
    }
}
