use teloxide::macros::BotCommands;

/// Type alias for handler result types
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Available bot commands
#[derive(BotCommands, Clone)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
pub enum Command {
    #[command(description = "Show the welcome message")]
    Start,
    #[command(description = "Display help information")]
    Help,
    #[command(description = "List download jobs (owner only)")]
    Status,
    #[command(description = "Cancel a job by id (owner only)")]
    Cancel,
    #[command(description = "Remove stale downloads (owner only)")]
    Clear,
}
