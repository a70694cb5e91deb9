//! Status texts shown to the submitter while their screenshot is processed.

use spamshot_core::ExtractionResult;

pub const DOWNLOADING: &str = "downloading image...";
pub const LOGGING_MESSAGE: &str = "logging telegram message...";
pub const READING: &str = "reading image...";
pub const PARSING: &str = "parsing text...";
pub const LOGGING_SPAMMERS: &str = "logging spammers...";

pub fn logging_spammer(phone_number: &str) -> String {
    format!("logging spammer ({phone_number})...")
}

pub fn queue_position(position: usize) -> String {
    match position {
        1 => "waiting in line... your screenshot is next".to_string(),
        n => format!("waiting in line... {} screenshots ahead of yours", n),
    }
}

/// Final summary: every number found, then the cleaned message body.
pub fn summary(result: &ExtractionResult) -> String {
    format!(
        "NUMBERS: {}\n\nMESSAGE: \n{}",
        result.all_numbers.join(","),
        result.cleaned_text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_numbers_then_text() {
        let result = ExtractionResult {
            sender_number: Some("639171234567".into()),
            all_numbers: vec!["639171234567".into(), "639179998888".into()],
            cleaned_text: "call 0917 999 8888 now".into(),
        };
        assert_eq!(
            summary(&result),
            "NUMBERS: 639171234567,639179998888\n\nMESSAGE: \ncall 0917 999 8888 now"
        );
    }

    #[test]
    fn queue_position_wording() {
        assert!(queue_position(1).contains("next"));
        assert!(queue_position(3).contains("3 screenshots ahead"));
    }
}
