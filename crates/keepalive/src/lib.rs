//! Keep-alive HTTP server
//!
//! This crate provides the minimal HTTP endpoint that hosting platforms
//! poll to keep the bot process alive, plus a small health report with
//! uptime and the number of running download jobs.

mod server;
mod state;

pub use server::KeepAliveApi;
pub use state::{JobGauge, ServerState};

/// Result type alias for keep-alive server operations
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
