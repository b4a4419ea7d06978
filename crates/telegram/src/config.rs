//! Runtime settings read from the environment
//!
//! Every knob has a working default; only the bot token (read by
//! teloxide itself from `TELOXIDE_TOKEN`) is mandatory.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use teloxide::types::UserId;

const DEFAULT_DOWNLOAD_DIR: &str = "/data/downloads";
const DEFAULT_KEEPALIVE_HOST: &str = "0.0.0.0";
const DEFAULT_KEEPALIVE_PORT: u16 = 7860;

/// Bot configuration shared across handlers and workers
#[derive(Debug, Clone)]
pub struct Settings {
    /// User allowed to run privileged commands
    pub owner_id: UserId,
    /// Root directory for per-job download directories
    pub download_root: PathBuf,
    /// Directory scan interval while a download runs
    pub poll_interval: Duration,
    /// Interval between progress message edits during upload
    pub progress_interval: Duration,
    /// A file counts as finished once its size is unchanged this long
    pub stable_window: Duration,
    /// Downloads older than this are removed by /clear and the sweeper
    pub cleanup_age_hours: i64,
    /// Width of the textual progress bar
    pub progress_bar_len: usize,
    /// Keep-alive server bind host
    pub keepalive_host: String,
    /// Keep-alive server bind port
    pub keepalive_port: u16,
}

impl Settings {
    pub fn from_env() -> Self {
        Settings {
            owner_id: UserId(env_parse("BOT_OWNER_ID", 0)),
            download_root: PathBuf::from(
                std::env::var("DOWNLOAD_DIR").unwrap_or_else(|_| DEFAULT_DOWNLOAD_DIR.to_string()),
            ),
            poll_interval: Duration::from_secs_f64(env_parse("DOWNLOAD_POLL_INTERVAL", 1.0)),
            progress_interval: Duration::from_secs_f64(env_parse(
                "UPLOAD_PROGRESS_UPDATE_INTERVAL",
                1.0,
            )),
            stable_window: Duration::from_secs_f64(env_parse("STABLE_SECONDS", 3.0)),
            cleanup_age_hours: env_parse("CLEANUP_AGE_HOURS", 6),
            progress_bar_len: env_parse("PROGRESS_BAR_LEN", 24),
            keepalive_host: std::env::var("KEEPALIVE_HOST")
                .unwrap_or_else(|_| DEFAULT_KEEPALIVE_HOST.to_string()),
            keepalive_port: env_parse("KEEPALIVE_PORT", DEFAULT_KEEPALIVE_PORT),
        }
    }

    /// Check whether a message sender is the configured owner
    pub fn is_owner(&self, user_id: Option<UserId>) -> bool {
        user_id == Some(self.owner_id)
    }
}

/// Parse an env var, falling back to the default when unset or malformed
fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_parse_default() {
        // Var not set in the test environment
        assert_eq!(env_parse("MEGASTREAM_TEST_UNSET_VAR", 42u64), 42);
    }

    #[test]
    fn test_is_owner() {
        let mut settings = Settings::from_env();
        settings.owner_id = UserId(1234);
        assert!(settings.is_owner(Some(UserId(1234))));
        assert!(!settings.is_owner(Some(UserId(5678))));
        assert!(!settings.is_owner(None));
    }
}
