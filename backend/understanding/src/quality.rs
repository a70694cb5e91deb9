//! Line quality filter: drops lines dominated by symbols.
//!
//! OCR over chat screenshots picks up status bar glyphs, box drawing and
//! speckle noise. A line survives only when ASCII letters and digits strictly
//! outnumber everything else on it (spaces and non-ASCII included).

/// True when `[A-Za-z0-9]` characters strictly outnumber all others.
pub fn is_legible(line: &str) -> bool {
    let (ok, not_ok) = line.chars().fold((0usize, 0usize), |(ok, not_ok), c| {
        if c.is_ascii_alphanumeric() {
            (ok + 1, not_ok)
        } else {
            (ok, not_ok + 1)
        }
    });
    ok > not_ok
}

/// Keep the legible lines, preserving their relative order.
pub fn filter_noise(lines: Vec<String>) -> Vec<String> {
    lines.into_iter().filter(|line| is_legible(line)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_must_be_strict() {
        assert!(is_legible("hello123"));
        assert!(!is_legible("!!!##"));
        assert!(!is_legible("a!"));
        assert!(!is_legible(""));
    }

    #[test]
    fn spaces_and_unicode_count_against() {
        assert!(is_legible("call 0917 999 8888 now"));
        assert!(!is_legible("ñ ñ ab"));
    }

    #[test]
    fn keeps_order() {
        let lines = vec!["first line".to_string(), "#$%&*()".to_string(), "last".to_string()];
        assert_eq!(filter_noise(lines), vec!["first line", "last"]);
    }
}
