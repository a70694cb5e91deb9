//! `spamshot-config`: runtime configuration for the Spamshot bot.
//!
//! Provides:
//! - Typed config schema with resolved accessors
//! - YAML loading from the config directory
//! - `${ENV_VAR}` substitution
//! - Default value application
//! - Validation with per-field errors and warnings
//! - Secret redaction for display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{collect_referenced_vars, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config};
pub use redact::redact;
pub use schema::SpamshotConfig;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use std::path::Path;

/// Load, apply env substitution, and apply defaults to a config file.
///
/// This is the main entry point for loading a config at runtime. Validation
/// problems are logged; callers decide whether to act on [`validate`].
pub async fn load_and_prepare(path: &Path) -> Result<SpamshotConfig> {
    let value = load_config(path).await?;

    // Substitute ${VAR} env vars.
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;

    let config: SpamshotConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prepares_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        tokio::fs::write(
            &path,
            "telegram:\n  botToken: \"42:xyz\"\nocr:\n  psm: 6\n",
        )
        .await
        .unwrap();

        let config = load_and_prepare(&path).await.unwrap();
        assert_eq!(config.bot_token(), Some("42:xyz"));
        assert_eq!(config.ocr_psm(), 6);
        assert_eq!(config.ocr_lang(), "eng");
        assert!(validate(&config).is_valid());
    }

    #[tokio::test]
    async fn wrong_types_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        tokio::fs::write(&path, "queue:\n  runTimeoutSecs: soon\n").await.unwrap();
        assert!(load_and_prepare(&path).await.is_err());
    }
}
