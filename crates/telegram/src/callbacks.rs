//! Callback query handlers for inline keyboard interactions

use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::constants::{emoji, MAX_CALLBACK_DATA_LEN};
use crate::jobs::JobRegistry;
use crate::types::HandlerResult;
use crate::Settings;

/// Handle all callback queries from inline keyboards
pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    registry: JobRegistry,
    settings: Settings,
) -> HandlerResult {
    // Answer callback query to remove loading state
    bot.answer_callback_query(&q.id).await?;

    let data = match q.data {
        Some(ref data) => data,
        None => return Ok(()),
    };

    if data.len() > MAX_CALLBACK_DATA_LEN {
        tracing::warn!("Callback data too long: {} bytes", data.len());
        return Ok(());
    }

    let message = match q.message {
        Some(msg) => msg,
        None => return Ok(()),
    };

    let parts: Vec<&str> = data.split(':').collect();
    match parts.as_slice() {
        ["cancel", job_id] => {
            let job = match registry.get(job_id) {
                Some(job) => job,
                None => {
                    bot.send_message(message.chat.id, format!("{} Job not found.", emoji::ERROR))
                        .await?;
                    return Ok(());
                }
            };

            // The button lives on the submitter's own status message; honor
            // the submitter and the owner
            let allowed = q.from.id == job.user_id || settings.is_owner(Some(q.from.id));
            if !allowed {
                tracing::debug!("User {} may not cancel job {}", q.from.id, job.id);
                return Ok(());
            }

            if registry.request_cancel(job_id) {
                bot.send_message(
                    message.chat.id,
                    format!("{} Cancel requested for `{}`.", emoji::WARNING, job_id),
                )
                .parse_mode(ParseMode::Markdown)
                .await?;
            } else {
                bot.send_message(
                    message.chat.id,
                    format!("{} Job `{}` already finished.", emoji::INFO, job_id),
                )
                .parse_mode(ParseMode::Markdown)
                .await?;
            }
        }
        _ => {
            tracing::debug!("Unknown callback: {}", data);
        }
    }

    Ok(())
}
