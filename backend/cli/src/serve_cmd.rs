//! `spamshot serve`: run the Telegram bot.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use teloxide::Bot;
use tracing::{error, info};

use spamshot_channels::{ChannelAdapter, TelegramBot, TelegramFileSource, TelegramSubmission};
use spamshot_config::{validate, SpamshotConfig};
use spamshot_executor::ScreenshotPipeline;
use spamshot_scheduler::{SubmissionHandler, SubmissionQueue};
use spamshot_store::SqliteSpamStore;

use crate::runtime;

pub async fn run(config: SpamshotConfig) -> Result<()> {
    let report = validate(&config);
    if !report.is_valid() {
        for err in &report.errors {
            error!(path = %err.path, message = %err.message, "Invalid config");
        }
        bail!("config has {} error(s); run `spamshot check-config`", report.errors.len());
    }
    let token = config
        .bot_token()
        .context("telegram.botToken is not set")?;

    let media_dir = config.media_dir();
    tokio::fs::create_dir_all(media_dir)
        .await
        .with_context(|| format!("Failed to create media directory: {media_dir}"))?;
    runtime::ensure_parent(Path::new(config.db_path())).await?;

    info!(
        media_dir = %media_dir,
        db = %config.db_path(),
        ocr = %config.ocr_command(),
        "Starting Spamshot"
    );

    let store = Arc::new(SqliteSpamStore::open(config.db_path())?);
    let bot = Bot::new(token);

    let pipeline = ScreenshotPipeline::new(
        Arc::new(TelegramFileSource::new(bot.clone())),
        Arc::new(runtime::ocr_engine(&config)),
        runtime::extractor(runtime::extraction_settings(&config)),
        store.clone(),
        media_dir,
    );
    let handler: Arc<dyn SubmissionHandler<TelegramSubmission>> = Arc::new(pipeline);
    let queue = SubmissionQueue::new(
        handler,
        Some(Duration::from_secs(config.run_timeout_secs())),
    );

    let adapter = TelegramBot::new(bot, queue.clone(), store);
    info!(channel = adapter.name(), "Channel adapter ready");
    adapter.start().await?;

    let (completed, failed) = queue.totals();
    info!(completed, failed, "Spamshot stopped");
    Ok(())
}
