//! Mega.nz download client wrapper
//!
//! This crate provides a simplified interface to the megatools `megadl`
//! command line client. It handles link validation, download retries,
//! error logging, and media metadata probing via ffprobe.

pub mod client;
pub mod error;
pub mod link;
pub mod media;

pub use client::MegaClient;
pub use error::MegaError;
pub use link::{is_mega_link, LinkKind, MegaLink};
