use std::fmt;
use std::path::PathBuf;

/// Custom error type for megadl operations
#[derive(Debug)]
pub enum MegaError {
    /// The megadl binary could not be spawned
    Spawn(std::io::Error),
    /// megadl exited with a non-zero status
    Failed {
        status: Option<i32>,
        stderr: String,
    },
    /// megadl refused to overwrite an existing local file
    AlreadyExists(PathBuf),
    /// Download kept failing after the configured retries
    RetriesExhausted { attempts: u32, last: String },
}

impl fmt::Display for MegaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MegaError::Spawn(e) => write!(f, "failed to run megadl: {}", e),
            MegaError::Failed { status, stderr } => {
                let stderr = stderr.trim();
                match status {
                    Some(code) => write!(f, "megadl exited with code {}: {}", code, stderr),
                    None => write!(f, "megadl terminated by signal: {}", stderr),
                }
            }
            MegaError::AlreadyExists(path) => {
                write!(f, "file already exists at {}", path.display())
            }
            MegaError::RetriesExhausted { attempts, last } => {
                write!(f, "download failed after {} retries: {}", attempts, last)
            }
        }
    }
}

impl std::error::Error for MegaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MegaError::Spawn(e) => Some(e),
            _ => None,
        }
    }
}
