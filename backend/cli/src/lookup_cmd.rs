//! `spamshot lookup <number>`

use anyhow::Result;
use spamshot_config::SpamshotConfig;
use spamshot_core::PhoneCanonicalizer;
use spamshot_store::SqliteSpamStore;
use spamshot_understanding::PhilippineCanonicalizer;

use crate::terminal_output::{note_success, note_warn, render_table, Column};

pub fn run(config: &SpamshotConfig, number: &str) -> Result<()> {
    let key = PhilippineCanonicalizer.canonicalize(number);
    let store = SqliteSpamStore::open(config.db_path())?;

    let Some(spammer) = store.get_spammer(&key)? else {
        note_warn(&format!("{key} has not been reported"));
        return Ok(());
    };

    let reports = store.messages_for(&spammer.spammer_id)?;
    note_success(&format!(
        "{} first reported {}, {} report(s)",
        spammer.phone_number,
        spammer.created_at,
        reports.len()
    ));

    let rows: Vec<Vec<String>> = reports
        .iter()
        .map(|r| {
            vec![
                r.created_at.format("%Y-%m-%d %H:%M").to_string(),
                r.user_id.to_string(),
                first_line(&r.ocr_text),
            ]
        })
        .collect();
    print!(
        "{}",
        render_table(
            &[Column::left("Reported"), Column::right("By"), Column::left("Message")],
            &rows
        )
    );
    Ok(())
}

fn first_line(text: &str) -> String {
    let line = text.lines().next().unwrap_or("");
    match line.char_indices().nth(60) {
        Some((cut, _)) => format!("{}...", &line[..cut]),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_preview_is_one_short_line() {
        assert_eq!(first_line("claim your prize\nreply now"), "claim your prize");
        let long = "x".repeat(80);
        assert_eq!(first_line(&long).len(), 63);
        assert_eq!(first_line(""), "");
    }
}
