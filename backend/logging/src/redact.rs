//! Log Redaction Layer
//!
//! Scrubs phone numbers and Telegram bot tokens from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

/// Philippine mobile numbers in local (`09…`) or international (`+63 9…`)
/// layout, with optional separators.
static TELEPHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?63|0)[-.\s]?9\d{2}[-.\s]?\d{3}[-.\s]?\d{4}").unwrap()
});

/// `<bot id>:<secret>` as issued by BotFather.
static BOT_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{6,}:[A-Za-z0-9_-]{30,}").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = BOT_TOKEN_RE.replace_all(input, "[REDACTED_TOKEN]");
    TELEPHONE_RE
        .replace_all(&redacted, "[REDACTED_PHONE]")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_phone_numbers() {
        let clean = redact_sensitive_data("text 0917 123 4567 or +639181234567 now");
        assert_eq!(clean, "text [REDACTED_PHONE] or [REDACTED_PHONE] now");
    }

    #[test]
    fn redacts_bot_token() {
        let raw = "GET /bot123456789:AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsaw0/getMe";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsaw0"));
        assert!(clean.contains("[REDACTED_TOKEN]"));
    }

    #[test]
    fn leaves_ordinary_text() {
        assert_eq!(redact_sensitive_data("promo ends 12/31"), "promo ends 12/31");
    }
}
