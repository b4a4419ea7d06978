//! Basic bot commands (start, help, fallback)

use teloxide::{prelude::*, utils::command::BotCommands};

use crate::types::{Command, HandlerResult};

/// Welcome message when user starts the bot
pub async fn start(bot: Bot, msg: Message) -> HandlerResult {
    let welcome_text = "👋 Welcome to MegaStream!\n\n\
        Send me a public Mega.nz file or folder link and I'll mirror it \
        into this chat, file by file, with live progress.\n\n\
        Owner commands: /status /cancel <job_id> /clear\n\
        See /help for details.";

    bot.send_message(msg.chat.id, welcome_text).await?;
    Ok(())
}

/// Display help message with available commands
pub async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

/// Handle messages that are neither commands nor Mega links
pub async fn fallback(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        "⚡ Send a public Mega.nz file or folder link to start.",
    )
    .await?;
    Ok(())
}
