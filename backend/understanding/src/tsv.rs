//! Tesseract TSV output parsing.
//!
//! Columns are located by header name, so extra or reordered columns are
//! tolerated. Rows that lack a `block_num`, `conf` or `text` field, or whose
//! numeric fields do not parse, are dropped rather than failing the run.

use spamshot_core::OcrToken;
use tracing::debug;

const BLOCK_COLUMN: &str = "block_num";
const CONFIDENCE_COLUMN: &str = "conf";
const TEXT_COLUMN: &str = "text";

/// Parse a Tesseract `tsv` report into OCR tokens, in table order.
pub fn parse_tsv(raw: &str) -> Vec<OcrToken> {
    let mut rows = raw.lines().filter(|line| !line.trim().is_empty());
    let Some(header) = rows.next() else {
        return Vec::new();
    };

    let columns: Vec<&str> = header.split('\t').map(str::trim).collect();
    let position = |name: &str| columns.iter().position(|c| *c == name);
    let (Some(block_idx), Some(conf_idx), Some(text_idx)) = (
        position(BLOCK_COLUMN),
        position(CONFIDENCE_COLUMN),
        position(TEXT_COLUMN),
    ) else {
        debug!(header = %header, "TSV header missing required columns");
        return Vec::new();
    };

    let mut skipped = 0usize;
    let tokens: Vec<OcrToken> = rows
        .filter_map(|row| {
            let fields: Vec<&str> = row.trim_end_matches('\r').split('\t').collect();
            let token = (|| {
                let block_id = fields.get(block_idx)?.trim().parse::<i64>().ok()?;
                let confidence = fields.get(conf_idx)?.trim().parse::<f32>().ok()?;
                let text = fields.get(text_idx)?.to_string();
                Some(OcrToken {
                    text,
                    confidence,
                    block_id,
                })
            })();
            if token.is_none() {
                skipped += 1;
            }
            token
        })
        .collect();

    debug!(tokens = tokens.len(), skipped, "Parsed TSV report");
    tokens
}
