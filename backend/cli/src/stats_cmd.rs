//! `spamshot stats`

use anyhow::Result;
use spamshot_config::SpamshotConfig;
use spamshot_store::SqliteSpamStore;

use crate::terminal_output::{note_info, render_table, Column};

pub fn run(config: &SpamshotConfig, limit: usize) -> Result<()> {
    let store = SqliteSpamStore::open(config.db_path())?;

    note_info(&format!(
        "{} submitters, {} messages received",
        store.user_count()?,
        store.message_count()?
    ));

    let top = store.top_spammers(limit)?;
    if top.is_empty() {
        note_info("No spammers reported yet.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = top
        .into_iter()
        .map(|s| vec![s.spammer_id, s.reports.to_string()])
        .collect();
    print!(
        "{}",
        render_table(&[Column::left("Number"), Column::right("Reports")], &rows)
    );
    Ok(())
}
