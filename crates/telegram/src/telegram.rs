use teloxide::{dispatching::UpdateHandler, prelude::*, utils::command::BotCommands};

use crate::types::Command;
use crate::{callbacks, commands, handlers};

/// Register bot commands in Telegram menu
pub async fn set_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(commands::start))
        .branch(case![Command::Help].endpoint(commands::help))
        .branch(case![Command::Status].endpoint(commands::status))
        .branch(case![Command::Cancel].endpoint(commands::cancel))
        .branch(case![Command::Clear].endpoint(commands::clear));

    let message_handler = Update::filter_message()
        .branch(command_handler)
        .branch(
            dptree::filter(|msg: Message| {
                msg.text().map(mega::is_mega_link).unwrap_or(false)
            })
            .endpoint(handlers::handle_link),
        )
        .branch(dptree::endpoint(commands::fallback));

    // Handle callback queries from inline keyboards
    let callback_handler = Update::filter_callback_query().endpoint(callbacks::handle_callback);

    dptree::entry()
        .branch(message_handler)
        .branch(callback_handler)
}
