//! Philippine mobile number detection.
//!
//! Covers the sender lookup at the top of a screenshot, the aggregation of
//! every number mentioned in the message, and canonicalization into the key
//! used for persistence.

use once_cell::sync::Lazy;
use regex::Regex;
use spamshot_core::PhoneCanonicalizer;

/// Optional `63` country code or `0…9` mobile prefix, then three groups of
/// 3–4 digits. Whitespace may separate the prefix and the groups.
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:(?:63|0*9)\s*)?\d{3,4}\s*\d{3,4}\s*\d{3,4}").unwrap()
});

/// Default share of the line set, from the top, searched for the sender.
pub const DEFAULT_SEARCH_WINDOW: f64 = 0.5;

const COUNTRY_CODE: &str = "63";

/// Every phone match in `text`, left to right.
pub fn find_phone_numbers(text: &str) -> Vec<String> {
    PHONE_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// The sender number and the lines left after the header is cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderMatch {
    /// First match on the matching line, unnormalized.
    pub number: String,
    /// Index of the line the number was found on.
    pub line_index: usize,
    /// Lines after the matching line.
    pub remaining: Vec<String>,
}

/// Scan the top of the line set for the sender's number.
///
/// Line `i` is searched while `i < lines.len() * window`. The first line with
/// a match wins; it and every line above it are treated as header and
/// dropped. Returns `None` when the window holds no number.
pub fn locate_sender(lines: &[String], window: f64) -> Option<SenderMatch> {
    let limit = lines.len() as f64 * window;
    lines
        .iter()
        .enumerate()
        .take_while(|(i, _)| (*i as f64) < limit)
        .find_map(|(i, line)| {
            PHONE_RE.find(line).map(|m| SenderMatch {
                number: m.as_str().to_string(),
                line_index: i,
                remaining: lines[i + 1..].to_vec(),
            })
        })
}

/// Every number mentioned in the message, with the sender seeded first.
pub fn collect_numbers(sender: &str, lines: &[String]) -> Vec<String> {
    let mut haystack = String::from(sender);
    for line in lines {
        haystack.push(' ');
        haystack.push_str(line);
    }
    find_phone_numbers(&haystack)
}

/// Canonical form `63` + ten-digit mobile number (`639171234567`).
///
/// Non-digits are stripped, then a leading `63` or any leading zeros are
/// removed and the country code is put back in front. Inputs that do not
/// reduce to a `9…` national number keep their bare digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhilippineCanonicalizer;

impl PhoneCanonicalizer for PhilippineCanonicalizer {
    fn canonicalize(&self, raw: &str) -> String {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        let national = match digits.strip_prefix(COUNTRY_CODE) {
            Some(rest) if rest.starts_with('9') => rest,
            _ => digits.trim_start_matches('0'),
        };
        if national.starts_with('9') {
            format!("{COUNTRY_CODE}{national}")
        } else {
            digits
        }
    }
}
