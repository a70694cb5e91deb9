//! Config validation with field paths and readable messages.

use crate::schema::SpamshotConfig;
use thiserror::Error;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &SpamshotConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_telegram(config, &mut report);
    validate_ocr(config, &mut report);
    validate_extraction(config, &mut report);
    validate_queue(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_telegram(config: &SpamshotConfig, report: &mut ValidationReport) {
    if config.bot_token().is_none() {
        report.error("telegram.botToken", "Telegram bot token is required");
    }
}

fn validate_ocr(config: &SpamshotConfig, report: &mut ValidationReport) {
    let Some(ocr) = &config.ocr else { return };
    if let Some(conf) = ocr.min_confidence {
        if !(0.0..=100.0).contains(&conf) {
            report.error(
                "ocr.minConfidence",
                format!("minConfidence must be between 0 and 100, got {conf}"),
            );
        }
    }
    if ocr.timeout_secs == Some(0) {
        report.error("ocr.timeoutSecs", "timeoutSecs must be >= 1");
    }
    if ocr.command.as_deref().is_some_and(|c| c.trim().is_empty()) {
        report.error("ocr.command", "OCR command cannot be empty");
    }
    if ocr.lang.as_deref().is_some_and(|l| l.trim().is_empty()) {
        report.warn("ocr.lang", "Empty language; Tesseract will fall back to its default");
    }
}

fn validate_extraction(config: &SpamshotConfig, report: &mut ValidationReport) {
    let Some(extraction) = &config.extraction else { return };
    if let Some(ratio) = extraction.search_window_ratio {
        if !(ratio > 0.0 && ratio <= 1.0) {
            report.error(
                "extraction.searchWindowRatio",
                format!("searchWindowRatio must be in (0, 1], got {ratio}"),
            );
        }
    }
}

fn validate_queue(config: &SpamshotConfig, report: &mut ValidationReport) {
    let Some(queue) = &config.queue else { return };
    if queue.run_timeout_secs == Some(0) {
        report.error("queue.runTimeoutSecs", "runTimeoutSecs must be >= 1");
    }
}

fn validate_logging(config: &SpamshotConfig, report: &mut ValidationReport) {
    let level = config.log_level();
    if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        report.warn(
            "logging.level",
            format!("Unknown level '{level}'; treated as a filter directive"),
        );
    }
}
