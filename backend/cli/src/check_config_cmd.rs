//! `spamshot check-config`

use std::path::Path;

use anyhow::Result;
use spamshot_config::{collect_referenced_vars, load_config, redact, validate, SpamshotConfig};

use crate::terminal_output::{note_error, note_info, note_success, note_warn};

pub async fn run(path: &Path, config: &SpamshotConfig) -> Result<()> {
    if path.exists() {
        note_info(&format!("Config file: {}", path.display()));
        let raw = load_config(path).await?;
        let vars = collect_referenced_vars(&raw);
        if !vars.is_empty() {
            note_info(&format!("Environment variables used: {}", vars.join(", ")));
        }
    } else {
        note_warn(&format!("{} does not exist; using defaults", path.display()));
    }

    println!("{}", serde_yaml::to_string(&redact(&serde_json::to_value(config)?))?);

    let report = validate(config);
    for warning in &report.warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }
    for error in &report.errors {
        note_error(&format!("{}: {}", error.path, error.message));
    }

    if report.is_valid() {
        note_success("Config is valid.");
        Ok(())
    } else {
        anyhow::bail!("config has {} error(s)", report.errors.len())
    }
}
