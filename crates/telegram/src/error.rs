use std::fmt;

/// Custom error type for telegram bot operations
#[derive(Debug)]
pub enum BotError {
    /// Telegram API error
    TelegramError(teloxide::RequestError),
    /// Mega download error
    MegaError(mega::MegaError),
    /// HTTP error on the direct upload path
    HttpError(reqwest::Error),
    /// Local filesystem error
    IoError(std::io::Error),
    /// Invalid command arguments
    InvalidArguments(String),
    /// Generic error with message
    Message(String),
}

impl fmt::Display for BotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotError::TelegramError(e) => write!(f, "Telegram error: {}", e),
            BotError::MegaError(e) => write!(f, "Mega error: {}", e),
            BotError::HttpError(e) => write!(f, "HTTP error: {}", e),
            BotError::IoError(e) => write!(f, "I/O error: {}", e),
            BotError::InvalidArguments(msg) => write!(f, "Invalid arguments: {}", msg),
            BotError::Message(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for BotError {}

impl From<teloxide::RequestError> for BotError {
    fn from(err: teloxide::RequestError) -> Self {
        BotError::TelegramError(err)
    }
}

impl From<mega::MegaError> for BotError {
    fn from(err: mega::MegaError) -> Self {
        BotError::MegaError(err)
    }
}

impl From<reqwest::Error> for BotError {
    fn from(err: reqwest::Error) -> Self {
        BotError::HttpError(err)
    }
}

impl From<std::io::Error> for BotError {
    fn from(err: std::io::Error) -> Self {
        BotError::IoError(err)
    }
}

/// Result type alias for bot operations
pub type BotResult<T> = Result<T, BotError>;

/// Helper trait to convert results into user-friendly messages
pub trait UserMessage {
    fn user_message(&self) -> String;
}

impl UserMessage for BotError {
    fn user_message(&self) -> String {
        match self {
            BotError::TelegramError(e) => format!("❌ Communication error: {}", e),
            BotError::MegaError(e) => format!("❌ Download error: {}", e),
            BotError::HttpError(e) => format!("❌ Upload error: {}", e),
            BotError::IoError(e) => format!("❌ Filesystem error: {}", e),
            BotError::InvalidArguments(msg) => format!("❌ {}", msg),
            BotError::Message(msg) => format!("❌ {}", msg),
        }
    }
}
