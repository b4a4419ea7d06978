//! Shared handler helpers and the Mega link entry point

use chrono::Utc;
use mega::{MegaClient, MegaLink};
use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode};
use teloxide::{ApiError, RequestError};

use crate::constants::emoji;
use crate::jobs::{self, Job, JobRegistry};
use crate::types::HandlerResult;
use crate::{keyboards, rate_limit, worker, Settings};

/// Handle to a job's editable status message
#[derive(Clone)]
pub struct StatusMessage {
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
}

impl StatusMessage {
    pub fn new(bot: Bot, chat_id: ChatId, message_id: MessageId) -> Self {
        Self {
            bot,
            chat_id,
            message_id,
        }
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    /// Edit the status message, swallowing "not modified" responses
    pub async fn edit(&self, text: &str) {
        let result = self
            .bot
            .edit_message_text(self.chat_id, self.message_id, text)
            .parse_mode(ParseMode::Markdown)
            .await;
        match result {
            Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => {}
            Err(err) => tracing::debug!("Status edit failed: {}", err),
        }
    }
}

/// Send a formatted message with emoji prefix
pub async fn send_response(bot: Bot, chat_id: ChatId, emoji: &str, message: &str) -> HandlerResult {
    bot.send_message(chat_id, format!("{} {}", emoji, message))
        .await?;
    Ok(())
}

/// Entry point for messages containing a Mega link
///
/// Registers a job, posts the editable status message with a cancel
/// button, and spawns the streaming worker.
pub async fn handle_link(
    bot: Bot,
    msg: Message,
    client: MegaClient,
    registry: JobRegistry,
    settings: Settings,
) -> HandlerResult {
    let user = match msg.from() {
        Some(user) => user,
        None => return Ok(()),
    };

    if !rate_limit::check_rate_limit(user.id.0) {
        tracing::debug!("Rate limited user: {}", user.id);
        send_response(
            bot,
            msg.chat.id,
            emoji::WARNING,
            "Slow down a little, then send the link again.",
        )
        .await?;
        return Ok(());
    }

    let link = match msg.text().and_then(MegaLink::find) {
        Some(link) => link,
        None => return Ok(()),
    };

    let job_id = jobs::new_job_id();
    let download_dir = settings
        .download_root
        .join(format!("user_{}_{}", user.id, job_id));

    let status_msg = bot
        .send_message(
            msg.chat.id,
            format!(
                "{} Job `{}` started\nProcessing `{}`",
                emoji::LINK,
                job_id,
                link
            ),
        )
        .parse_mode(ParseMode::Markdown)
        .reply_markup(keyboards::job_status_keyboard(&job_id))
        .await?;

    let job = Job {
        id: job_id.clone(),
        chat_id: msg.chat.id,
        user_id: user.id,
        url: link.as_str().to_string(),
        download_dir,
        status_message: status_msg.id,
        started_at: Utc::now(),
        cancel_requested: false,
        done: false,
    };
    registry.insert(job);

    tracing::info!("Queued job {} for user {}: {}", job_id, user.id, link);
    tokio::spawn(worker::run(
        bot.clone(),
        settings,
        client,
        registry,
        job_id.clone(),
    ));

    bot.send_message(
        msg.chat.id,
        format!(
            "{} Job queued: `{}` — I'll update the status message as I download & upload.",
            emoji::BELL,
            job_id
        ),
    )
    .parse_mode(ParseMode::Markdown)
    .await?;

    Ok(())
}
