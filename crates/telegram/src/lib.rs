pub mod callbacks;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod keyboards;
pub mod rate_limit;
pub mod telegram;
pub mod types;
pub mod upload;
pub mod utils;
pub mod worker;

pub use config::Settings;
pub use error::{BotError, BotResult};
pub use jobs::{Job, JobRegistry};
pub use teloxide::prelude::Dispatcher;
pub use types::{Command, HandlerResult};
