//! `spamshot scan`: OCR and extraction on a local file, printed as JSON.
//!
//! Nothing is queued or stored.

use std::path::Path;

use anyhow::{Context, Result};
use spamshot_config::SpamshotConfig;
use spamshot_core::OcrEngine;

use crate::runtime;

pub async fn run(config: &SpamshotConfig, image: &Path, min_confidence: Option<f32>) -> Result<()> {
    if !image.exists() {
        anyhow::bail!("image not found: {}", image.display());
    }

    let mut settings = runtime::extraction_settings(config);
    if let Some(min) = min_confidence {
        settings.min_confidence = min;
    }

    let ocr = runtime::ocr_engine(config)
        .recognize(image)
        .await
        .with_context(|| format!("OCR failed for {}", image.display()))?;
    let result = runtime::extractor(settings).extract(&ocr.tokens)?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
