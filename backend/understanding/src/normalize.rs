//! Token table normalizer: rebuilds text lines from OCR fragments.

use std::collections::HashMap;

use spamshot_core::OcrToken;

/// Rebuild one line per block id from the surviving tokens.
///
/// Tokens with `confidence < min_confidence` are dropped first. Survivors are
/// grouped by block id regardless of adjacency, joined with a single space in
/// table order, and lines are emitted in order of each block id's first
/// appearance. An empty result means nothing was recognized.
pub fn reconstruct_lines(tokens: &[OcrToken], min_confidence: f32) -> Vec<String> {
    let mut slots: HashMap<i64, usize> = HashMap::new();
    let mut groups: Vec<Vec<&str>> = Vec::new();

    for token in tokens.iter().filter(|t| t.confidence >= min_confidence) {
        let slot = *slots.entry(token.block_id).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(token.text.as_str());
    }

    groups.into_iter().map(|parts| parts.join(" ")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_threshold_only_yields_nothing() {
        let tokens = vec![
            OcrToken::new("faint", 3.0, 1),
            OcrToken::new("", -1.0, 0),
            OcrToken::new("blur", 9.9, 2),
        ];
        assert!(reconstruct_lines(&tokens, 10.0).is_empty());
    }

    #[test]
    fn groups_by_block_id_not_adjacency() {
        let tokens = vec![
            OcrToken::new("0917", 90.0, 1),
            OcrToken::new("SPAM", 90.0, 2),
            OcrToken::new("555", 90.0, 1),
        ];
        assert_eq!(reconstruct_lines(&tokens, 0.0), vec!["0917 555", "SPAM"]);
    }

    #[test]
    fn lines_follow_first_appearance_not_id_order() {
        let tokens = vec![
            OcrToken::new("second", 80.0, 7),
            OcrToken::new("first", 80.0, 3),
            OcrToken::new("again", 80.0, 7),
        ];
        assert_eq!(reconstruct_lines(&tokens, 1.0), vec!["second again", "first"]);
    }

    #[test]
    fn threshold_is_inclusive() {
        let tokens = vec![
            OcrToken::new("kept", 25.0, 1),
            OcrToken::new("dropped", 24.9, 1),
        ];
        assert_eq!(reconstruct_lines(&tokens, 25.0), vec!["kept"]);
    }
}
