//! megadl process wrapper

use std::path::Path;
use std::process::ExitStatus;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use tokio::process::Command;

use crate::error::MegaError;
use crate::link::MegaLink;

const DEFAULT_BINARY: &str = "megadl";
const DEFAULT_RETRIES: u32 = 3;

/// megadl prints this to stderr when it refuses to overwrite local files
fn exists_regex() -> &'static Regex {
    static EXISTS_RE: OnceLock<Regex> = OnceLock::new();
    EXISTS_RE.get_or_init(|| {
        Regex::new(r"File already exists at (.+)").expect("exists regex is valid")
    })
}

/// Wrapper around the megatools `megadl` command line client
#[derive(Debug, Clone)]
pub struct MegaClient {
    binary: String,
    retries: u32,
}

impl Default for MegaClient {
    fn default() -> Self {
        Self::from_env()
    }
}

impl MegaClient {
    /// Create a new MegaClient instance from environment variables
    ///
    /// `MEGADL_BIN` overrides the binary name, `MEGADL_RETRY` the retry
    /// count. Both have working defaults.
    pub fn from_env() -> Self {
        let binary = std::env::var("MEGADL_BIN").unwrap_or_else(|_| DEFAULT_BINARY.to_string());
        let retries = std::env::var("MEGADL_RETRY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RETRIES);
        MegaClient { binary, retries }
    }

    /// Probe that the megadl binary is present and runnable
    ///
    /// # Errors
    /// Returns an error if the binary cannot be spawned or exits non-zero
    pub async fn version(&self) -> Result<String, MegaError> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .output()
            .await
            .map_err(|e| {
                tracing::error!("Failed to spawn {}: {}", self.binary, e);
                MegaError::Spawn(e)
            })?;

        if !output.status.success() {
            return Err(classify_failure(output.status, &output.stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().to_string())
    }

    /// Download a link into `dest`, a single megadl invocation
    ///
    /// megadl creates `dest` if needed and, for folder links, recreates the
    /// remote directory tree below it.
    pub async fn download(&self, link: &MegaLink, dest: &Path) -> Result<(), MegaError> {
        tracing::info!("Downloading {} into {}", link, dest.display());
        let output = Command::new(&self.binary)
            .arg("--path")
            .arg(dest)
            .arg(link.as_str())
            .output()
            .await
            .map_err(|e| {
                tracing::error!("Failed to spawn {}: {}", self.binary, e);
                MegaError::Spawn(e)
            })?;

        if output.status.success() {
            Ok(())
        } else {
            let err = classify_failure(output.status, &output.stderr);
            tracing::error!("Download failed: {}", err);
            Err(err)
        }
    }

    /// Download with automatic recovery from stale local files
    ///
    /// When megadl reports an already existing file, that file is removed
    /// and the download retried, up to the configured retry count. Any
    /// other failure aborts immediately.
    pub async fn download_with_retry(&self, link: &MegaLink, dest: &Path) -> Result<(), MegaError> {
        let mut last = String::new();
        for attempt in 1..=self.retries {
            match self.download(link, dest).await {
                Ok(()) => return Ok(()),
                Err(MegaError::AlreadyExists(path)) => {
                    tracing::info!(
                        "Attempt {}: removing existing file to allow retry: {}",
                        attempt,
                        path.display()
                    );
                    last = format!("file already exists at {}", path.display());
                    if let Err(e) = tokio::fs::remove_file(&path).await {
                        tracing::debug!("Failed to remove {}: {}", path.display(), e);
                    }
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
                Err(err) => return Err(err),
            }
        }
        Err(MegaError::RetriesExhausted {
            attempts: self.retries,
            last,
        })
    }
}

/// Turn a non-zero megadl exit into the most specific error we can
fn classify_failure(status: ExitStatus, stderr: &[u8]) -> MegaError {
    let stderr = String::from_utf8_lossy(stderr).to_string();
    if let Some(path) = parse_exists_path(&stderr) {
        return MegaError::AlreadyExists(path.into());
    }
    MegaError::Failed {
        status: status.code(),
        stderr,
    }
}

/// Extract the offending path from an "already exists" stderr line
fn parse_exists_path(stderr: &str) -> Option<String> {
    exists_regex()
        .captures(stderr)
        .map(|c| c[1].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exists_path() {
        let stderr = "ERROR: File already exists at /data/downloads/job1/movie.mkv";
        assert_eq!(
            parse_exists_path(stderr),
            Some("/data/downloads/job1/movie.mkv".to_string())
        );
    }

    #[test]
    fn test_parse_exists_path_trims() {
        let stderr = "File already exists at /tmp/a.bin \n";
        assert_eq!(parse_exists_path(stderr), Some("/tmp/a.bin".to_string()));
    }

    #[test]
    fn test_parse_exists_path_no_match() {
        assert_eq!(parse_exists_path("ERROR: network timed out"), None);
        assert_eq!(parse_exists_path(""), None);
    }

    #[test]
    fn test_from_env_defaults() {
        // No env overrides set in the test environment
        let client = MegaClient::from_env();
        assert_eq!(client.retries, DEFAULT_RETRIES);
        assert!(!client.binary.is_empty());
    }
}
