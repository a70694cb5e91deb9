use std::sync::Arc;

use async_trait::async_trait;
use spamshot_core::{ProgressNotifier, ReceivedMessage, SpamStore, SpamshotError, Submitter};
use spamshot_executor::{progress, ScreenshotRequest, ScreenshotSubmission};
use spamshot_logging::redact_sensitive_data;
use spamshot_scheduler::{Admission, Submission, SubmissionQueue};
use teloxide::prelude::*;
use teloxide::types::{MessageId, User};
use teloxide::{ApiError, RequestError};
use tracing::{debug, error, info, warn};

use crate::telegram_commands::{BotCommand, HELP_TEXT};
use crate::telegram_media::screenshot_file;
use crate::ChannelAdapter;

/// One screenshot queued from a Telegram chat, tied to its status message.
pub struct TelegramSubmission {
    bot: Bot,
    chat_id: ChatId,
    status_id: MessageId,
    request: ScreenshotRequest,
}

impl TelegramSubmission {
    pub fn new(bot: Bot, chat_id: ChatId, status_id: MessageId, request: ScreenshotRequest) -> Self {
        Self {
            bot,
            chat_id,
            status_id,
            request,
        }
    }
}

#[async_trait]
impl ProgressNotifier for TelegramSubmission {
    async fn update(&self, text: &str) -> Result<(), SpamshotError> {
        match self
            .bot
            .edit_message_text(self.chat_id, self.status_id, text)
            .await
        {
            Ok(_) => Ok(()),
            // Same text twice in a row.
            Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
            Err(e) => Err(SpamshotError::Notify(e.to_string())),
        }
    }
}

#[async_trait]
impl Submission for TelegramSubmission {
    fn id(&self) -> String {
        format!("{}/{}", self.chat_id.0, self.status_id.0)
    }

    async fn notify_position(&self, position: usize) {
        if let Err(e) = self.update(&progress::queue_position(position)).await {
            warn!(submission = %self.id(), error = %e, "Failed to post queue position");
        }
    }
}

impl ScreenshotSubmission for TelegramSubmission {
    fn request(&self) -> &ScreenshotRequest {
        &self.request
    }

    fn progress(&self) -> &dyn ProgressNotifier {
        self
    }
}

struct BotState {
    queue: SubmissionQueue<TelegramSubmission>,
    store: Arc<dyn SpamStore>,
}

/// Long-polling Telegram front end feeding the submission queue.
pub struct TelegramBot {
    bot: Bot,
    state: Arc<BotState>,
}

impl TelegramBot {
    pub fn new(
        bot: Bot,
        queue: SubmissionQueue<TelegramSubmission>,
        store: Arc<dyn SpamStore>,
    ) -> Self {
        Self {
            bot,
            state: Arc::new(BotState { queue, store }),
        }
    }
}

#[async_trait]
impl ChannelAdapter for TelegramBot {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> anyhow::Result<()> {
        info!("Starting Telegram adapter");

        let handler = Update::filter_message().endpoint(handle_message);

        Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![Arc::clone(&self.state)])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Telegram adapter stopped");
        Ok(())
    }
}

async fn handle_message(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(user) = msg.from.clone() else {
        debug!(chat_id = msg.chat.id.0, "Ignoring message without sender");
        return Ok(());
    };
    let submitter = submitter_from(&user);

    if let Err(e) = state.store.upsert_user(&submitter).await {
        error!(user_id = submitter.user_id, error = %e, "Failed to store user");
    }

    if let Some(command) = msg.text().and_then(BotCommand::parse) {
        debug!(?command, chat_id = msg.chat.id.0, "Command received");
        bot.send_message(msg.chat.id, command.reply()).await?;
        return Ok(());
    }

    let Some(file) = screenshot_file(&msg) else {
        if let Some(text) = msg.text() {
            debug!(text = %redact_sensitive_data(text), "Not a screenshot; sending help");
        }
        bot.send_message(msg.chat.id, HELP_TEXT).await?;
        return Ok(());
    };

    let status = bot.send_message(msg.chat.id, progress::DOWNLOADING).await?;
    let request = ScreenshotRequest {
        submitter,
        message: ReceivedMessage {
            message_id: i64::from(msg.id.0),
            user_id: user.id.0 as i64,
            raw: serde_json::to_value(&msg).unwrap_or_default(),
        },
        file,
    };

    let submission = TelegramSubmission::new(bot, msg.chat.id, status.id, request);
    let id = submission.id();
    match state.queue.submit(submission).await {
        Admission::Started => info!(submission = %id, "Screenshot accepted"),
        Admission::Queued { position } => {
            info!(submission = %id, position, "Screenshot queued")
        }
    }
    Ok(())
}

fn submitter_from(user: &User) -> Submitter {
    Submitter {
        user_id: user.id.0 as i64,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        username: user.username.clone(),
        raw: serde_json::to_value(user).unwrap_or_default(),
    }
}
