//! Optical Character Recognition (OCR)
//!
//! Runs the Tesseract CLI over a screenshot and reads back its TSV report,
//! which carries the per-word confidence and block grouping the extraction
//! stages need.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use spamshot_core::{OcrEngine, OcrOutput, SpamshotError};
use tokio::process::Command;
use tracing::{debug, info};

use crate::tsv::parse_tsv;

/// How Tesseract is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TesseractOptions {
    /// Executable name or path.
    pub command: String,
    pub lang: String,
    /// OCR engine mode (`--oem`).
    pub oem: u8,
    /// Page segmentation mode (`--psm`).
    pub psm: u8,
    /// Upper bound for one invocation; the child is killed when it expires.
    pub timeout_secs: u64,
}

impl Default for TesseractOptions {
    fn default() -> Self {
        Self {
            command: "tesseract".to_string(),
            lang: "eng".to_string(),
            oem: 3,
            psm: 3,
            timeout_secs: 60,
        }
    }
}

pub struct TesseractEngine {
    options: TesseractOptions,
}

impl TesseractEngine {
    pub fn new(options: TesseractOptions) -> Self {
        Self { options }
    }

    /// Arguments for `tesseract <image> stdout ... tsv`.
    fn args(&self, image_path: &Path) -> Vec<String> {
        vec![
            image_path.display().to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.options.lang.clone(),
            "--oem".to_string(),
            self.options.oem.to_string(),
            "--psm".to_string(),
            self.options.psm.to_string(),
            "tsv".to_string(),
        ]
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(&self, image_path: &Path) -> Result<OcrOutput, SpamshotError> {
        info!(image = %image_path.display(), lang = %self.options.lang, "Running OCR");

        let child = Command::new(&self.options.command)
            .args(self.args(image_path))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let limit = Duration::from_secs(self.options.timeout_secs);
        let output = tokio::time::timeout(limit, child)
            .await
            .map_err(|_| {
                SpamshotError::Ocr(format!(
                    "{} timed out after {}s",
                    self.options.command, self.options.timeout_secs
                ))
            })?
            .map_err(|e| {
                SpamshotError::Ocr(format!("failed to start {}: {e}", self.options.command))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpamshotError::Ocr(format!(
                "{} exited with {}: {}",
                self.options.command,
                output.status,
                stderr.trim()
            )));
        }

        let raw = String::from_utf8_lossy(&output.stdout).into_owned();
        let tokens = parse_tsv(&raw);
        debug!(tokens = tokens.len(), "OCR finished");
        Ok(OcrOutput { raw, tokens })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn builds_tsv_invocation() {
        let engine = TesseractEngine::new(TesseractOptions::default());
        let args = engine.args(&PathBuf::from("/tmp/shot.png"));
        assert_eq!(
            args,
            vec!["/tmp/shot.png", "stdout", "-l", "eng", "--oem", "3", "--psm", "3", "tsv"]
        );
    }

    #[tokio::test]
    async fn missing_binary_is_an_ocr_error() {
        let engine = TesseractEngine::new(TesseractOptions {
            command: "spamshot-no-such-tesseract".into(),
            ..Default::default()
        });
        let err = engine.recognize(Path::new("/tmp/none.png")).await.unwrap_err();
        assert!(matches!(err, SpamshotError::Ocr(_)));
    }
}
