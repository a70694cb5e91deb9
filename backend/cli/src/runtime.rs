//! Builds runtime components from the loaded config.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use spamshot_config::{config_dir, config_file_path, SpamshotConfig};
use spamshot_understanding::{
    ExtractionSettings, Extractor, PhilippineCanonicalizer, TesseractEngine, TesseractOptions,
};

pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| config_file_path(&config_dir()))
}

pub fn init_logging(config: &SpamshotConfig, level: &str) -> Result<()> {
    spamshot_logging::init_logger(config.log_dir(), level)
}

pub fn extraction_settings(config: &SpamshotConfig) -> ExtractionSettings {
    ExtractionSettings {
        min_confidence: config.min_confidence(),
        search_window: config.search_window_ratio(),
    }
}

pub fn extractor(settings: ExtractionSettings) -> Extractor {
    Extractor::new(settings, Arc::new(PhilippineCanonicalizer))
}

pub fn ocr_engine(config: &SpamshotConfig) -> TesseractEngine {
    TesseractEngine::new(TesseractOptions {
        command: config.ocr_command().to_string(),
        lang: config.ocr_lang().to_string(),
        oem: config.ocr_oem(),
        psm: config.ocr_psm(),
        timeout_secs: config.ocr_timeout_secs(),
    })
}

/// Create the parent directory of `path` if it has one.
pub async fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spamshot_config::apply_all_defaults;

    #[test]
    fn settings_follow_config() {
        let config: SpamshotConfig =
            serde_yaml::from_str("ocr:\n  minConfidence: 42\nextraction:\n  searchWindowRatio: 0.3\n")
                .unwrap();
        let settings = extraction_settings(&apply_all_defaults(config));
        assert_eq!(settings.min_confidence, 42.0);
        assert_eq!(settings.search_window, 0.3);
    }

    #[test]
    fn explicit_config_path_wins() {
        let path = config_path(Some(PathBuf::from("/etc/spamshot.yaml")));
        assert_eq!(path, PathBuf::from("/etc/spamshot.yaml"));
    }
}
