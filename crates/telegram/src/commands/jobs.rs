//! Owner commands for job management (status, cancel, clear)

use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::constants::{emoji, usage};
use crate::handlers;
use crate::jobs::{self, JobRegistry};
use crate::types::HandlerResult;
use crate::{utils, Settings};

/// List all jobs with their state
pub async fn status(
    bot: Bot,
    msg: Message,
    registry: JobRegistry,
    settings: Settings,
) -> HandlerResult {
    if !settings.is_owner(msg.from().map(|u| u.id)) {
        return handlers::send_response(bot, msg.chat.id, emoji::ERROR, "Owner only.").await;
    }

    let all = registry.snapshot();
    if all.is_empty() {
        return handlers::send_response(bot, msg.chat.id, emoji::INFO, "No jobs yet.").await;
    }

    let lines: Vec<String> = all
        .iter()
        .map(|job| {
            let state = if job.done {
                "✅ done"
            } else if job.cancel_requested {
                "⚠ cancelled"
            } else {
                "⏳ running"
            };
            format!(
                "`{}` — {} — {} — started `{}`",
                job.id,
                state,
                job.url,
                job.started_at.format("%Y-%m-%d %H:%M:%S")
            )
        })
        .collect();

    bot.send_message(msg.chat.id, format!("🧾 Jobs:\n{}", lines.join("\n")))
        .parse_mode(ParseMode::Markdown)
        .await?;
    Ok(())
}

/// Flag a running job for cancellation
pub async fn cancel(
    bot: Bot,
    msg: Message,
    registry: JobRegistry,
    settings: Settings,
) -> HandlerResult {
    if !settings.is_owner(msg.from().map(|u| u.id)) {
        return handlers::send_response(bot, msg.chat.id, emoji::ERROR, "Owner only.").await;
    }

    let args = utils::parse_args(msg.text().unwrap_or(""));
    let job_id = match utils::extract_job_arg(&args) {
        Ok(id) => id,
        Err(e) => {
            bot.send_message(
                msg.chat.id,
                format!("{} {}\n{}", emoji::ERROR, e, usage::CANCEL),
            )
            .await?;
            return Ok(());
        }
    };

    if registry.request_cancel(job_id) {
        bot.send_message(
            msg.chat.id,
            format!("{} Cancel requested for `{}`.", emoji::WARNING, job_id),
        )
        .parse_mode(ParseMode::Markdown)
        .await?;
    } else {
        bot.send_message(
            msg.chat.id,
            format!("{} Job `{}` not found or already finished.", emoji::ERROR, job_id),
        )
        .parse_mode(ParseMode::Markdown)
        .await?;
    }
    Ok(())
}

/// Remove stale entries from the download root
pub async fn clear(bot: Bot, msg: Message, settings: Settings) -> HandlerResult {
    if !settings.is_owner(msg.from().map(|u| u.id)) {
        return handlers::send_response(bot, msg.chat.id, emoji::ERROR, "Owner only.").await;
    }

    match jobs::prune_stale(&settings.download_root, settings.cleanup_age_hours).await {
        Ok(removed) => {
            handlers::send_response(
                bot,
                msg.chat.id,
                emoji::CLEAN,
                &format!("Cleared {} old download folder(s).", removed),
            )
            .await
        }
        Err(err) => {
            tracing::error!("Prune failed: {}", err);
            handlers::send_response(
                bot,
                msg.chat.id,
                emoji::ERROR,
                &format!("Cleanup failed: {}", err),
            )
            .await
        }
    }
}
