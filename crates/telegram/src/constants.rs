//! Constants used throughout the telegram bot

/// Telegram bot upload ceiling, with safety margin (2 GiB)
pub const MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// Minimum interval between link submissions per user
pub const RATE_LIMIT_SECONDS: u64 = 5;

/// Maximum accepted callback data length
pub const MAX_CALLBACK_DATA_LEN: usize = 64;

/// Length of generated job ids
pub const JOB_ID_LEN: usize = 8;

/// Hard timeout for a single upload request
pub const UPLOAD_TIMEOUT_SECS: u64 = 3600;

/// Emoji constants for consistent UI
pub mod emoji {
    pub const SUCCESS: &str = "✅";
    pub const ERROR: &str = "❌";
    pub const WARNING: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const LINK: &str = "🔗";
    pub const BELL: &str = "🔔";
    pub const DOWNLOAD: &str = "📥";
    pub const UPLOAD: &str = "📤";
    pub const PACKAGE: &str = "📦";
    pub const SPEED: &str = "⚡";
    pub const CLOCK: &str = "⏱";
    pub const CLEAN: &str = "🧹";
}

/// Usage messages for commands
pub mod usage {
    pub const CANCEL: &str = "Usage: /cancel <job_id>\n\nTip: use /status to get job ids. Tap the monospace id to copy it.";
}
