//! Command handlers for the Telegram bot
//!
//! - `basic`: start, help, and the fallback for unrecognized messages
//! - `jobs`: owner commands for job listing, cancellation, and cleanup

mod basic;
mod jobs;

pub use basic::*;
pub use jobs::*;
