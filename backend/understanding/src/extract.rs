//! Extraction stages wired together: tokens in, numbers and body text out.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use spamshot_core::{ExtractionResult, OcrToken, PhoneCanonicalizer, SpamshotError};
use tracing::{debug, info};

use crate::normalize::reconstruct_lines;
use crate::phone::{collect_numbers, locate_sender, PhilippineCanonicalizer, DEFAULT_SEARCH_WINDOW};
use crate::quality::filter_noise;

/// Default minimum token confidence.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 10.0;

/// Tunable heuristics for the extraction stages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionSettings {
    /// Tokens scoring below this never reach line reconstruction.
    pub min_confidence: f32,
    /// Share of lines, from the top, searched for the sender number.
    pub search_window: f64,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            search_window: DEFAULT_SEARCH_WINDOW,
        }
    }
}

/// Run every extraction stage, returning raw (uncanonicalized) numbers.
///
/// Fails with [`SpamshotError::NoNumberFound`] when the top of the page has no
/// phone number, which includes the case where nothing was recognized.
pub fn extract_raw(
    tokens: &[OcrToken],
    settings: &ExtractionSettings,
) -> Result<ExtractionResult, SpamshotError> {
    let lines = reconstruct_lines(tokens, settings.min_confidence);
    debug!(tokens = tokens.len(), lines = lines.len(), "Reconstructed lines");

    let sender =
        locate_sender(&lines, settings.search_window).ok_or(SpamshotError::NoNumberFound)?;
    debug!(line = sender.line_index, "Sender number located");

    let body = filter_noise(sender.remaining);
    let all_numbers = collect_numbers(&sender.number, &body);

    Ok(ExtractionResult {
        sender_number: Some(sender.number),
        all_numbers,
        cleaned_text: body.join("\n"),
    })
}

/// Extraction with canonicalized phone numbers.
#[derive(Clone)]
pub struct Extractor {
    settings: ExtractionSettings,
    canonicalizer: Arc<dyn PhoneCanonicalizer>,
}

impl Extractor {
    pub fn new(settings: ExtractionSettings, canonicalizer: Arc<dyn PhoneCanonicalizer>) -> Self {
        Self {
            settings,
            canonicalizer,
        }
    }

    pub fn settings(&self) -> &ExtractionSettings {
        &self.settings
    }

    pub fn extract(&self, tokens: &[OcrToken]) -> Result<ExtractionResult, SpamshotError> {
        let raw = extract_raw(tokens, &self.settings)?;
        let canonical = |n: &String| self.canonicalizer.canonicalize(n);
        let result = ExtractionResult {
            sender_number: raw.sender_number.as_ref().map(canonical),
            all_numbers: raw.all_numbers.iter().map(canonical).collect(),
            cleaned_text: raw.cleaned_text,
        };
        info!(numbers = result.all_numbers.len(), "Extraction complete");
        Ok(result)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractionSettings::default(), Arc::new(PhilippineCanonicalizer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(text: &str, block_id: i64) -> Vec<OcrToken> {
        text.split(' ')
            .map(|word| OcrToken::new(word, 90.0, block_id))
            .collect()
    }

    fn screenshot() -> Vec<OcrToken> {
        let mut tokens = Vec::new();
        tokens.extend(block("09171234567 sent you a message", 1));
        tokens.extend(block("#$%&*()", 2));
        tokens.extend(block("call 0917 999 8888 now", 3));
        tokens
    }

    #[test]
    fn end_to_end_screenshot() {
        let result = Extractor::default().extract(&screenshot()).unwrap();
        assert_eq!(result.sender_number.as_deref(), Some("639171234567"));
        assert_eq!(result.cleaned_text, "call 0917 999 8888 now");
        assert_eq!(result.all_numbers, vec!["639171234567", "639179998888"]);
    }

    #[test]
    fn raw_result_keeps_matched_text() {
        let result = extract_raw(&screenshot(), &ExtractionSettings::default()).unwrap();
        assert_eq!(result.sender_number.as_deref(), Some("09171234567"));
        assert_eq!(result.all_numbers, vec!["09171234567", "0917 999 8888"]);
    }

    #[test]
    fn sender_is_first_even_when_repeated_in_body() {
        let mut tokens = block("0917 123 4567", 1);
        tokens.extend(block("reply to 09171234567 to claim", 2));
        tokens.extend(block("footer text here", 3));
        tokens.extend(block("more footer text", 4));
        let result = Extractor::default().extract(&tokens).unwrap();
        assert_eq!(result.all_numbers, vec!["639171234567", "639171234567"]);
    }

    #[test]
    fn faint_tokens_lead_to_no_number() {
        let tokens: Vec<OcrToken> = screenshot()
            .into_iter()
            .map(|t| OcrToken { confidence: 2.0, ..t })
            .collect();
        let err = Extractor::default().extract(&tokens).unwrap_err();
        assert!(matches!(err, SpamshotError::NoNumberFound));
    }

    #[test]
    fn extraction_is_idempotent() {
        let extractor = Extractor::default();
        let first = extractor.extract(&screenshot()).unwrap();
        let second = extractor.extract(&screenshot()).unwrap();
        assert_eq!(first, second);
    }
}
