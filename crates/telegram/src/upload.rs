//! File upload pipeline with live progress
//!
//! Primary path posts directly to the Bot API with a streamed multipart
//! body so upload progress can be reported into the status message.
//! Any failure there falls back to a plain teloxide send without live
//! progress.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::TryStreamExt;
use teloxide::prelude::*;
use teloxide::types::InputFile;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::constants::{emoji, UPLOAD_TIMEOUT_SECS};
use crate::error::BotError;
use crate::handlers::StatusMessage;
use crate::utils::{format_hms, format_size, progress_bar};
use crate::Settings;

/// Bot API send method a file maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Video,
    Photo,
    Audio,
    Document,
}

impl UploadKind {
    /// Pick the send method from the file's mime type
    pub fn detect(path: &Path) -> Self {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        match mime.type_().as_str() {
            "video" => UploadKind::Video,
            "image" => UploadKind::Photo,
            "audio" => UploadKind::Audio,
            _ => UploadKind::Document,
        }
    }

    fn api_method(&self) -> &'static str {
        match self {
            UploadKind::Video => "sendVideo",
            UploadKind::Photo => "sendPhoto",
            UploadKind::Audio => "sendAudio",
            UploadKind::Document => "sendDocument",
        }
    }

    fn field(&self) -> &'static str {
        match self {
            UploadKind::Video => "video",
            UploadKind::Photo => "photo",
            UploadKind::Audio => "audio",
            UploadKind::Document => "document",
        }
    }
}

/// Uploads files to a chat, editing a status message as bytes go out
pub struct Uploader {
    bot: Bot,
    http: reqwest::Client,
}

impl Uploader {
    pub fn new(bot: Bot) -> Self {
        Self {
            bot,
            http: reqwest::Client::new(),
        }
    }

    /// Upload one file, with live progress when possible
    pub async fn send_file(
        &self,
        path: &Path,
        status: &StatusMessage,
        settings: &Settings,
    ) -> Result<(), BotError> {
        let kind = UploadKind::detect(path);
        match self.send_multipart(path, kind, status, settings).await {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::warn!(
                    "Direct upload of {} failed ({}), falling back to plain send",
                    path.display(),
                    err
                );
                self.send_fallback(path, kind, status).await
            }
        }
    }

    /// Streamed multipart POST to the Bot API with a progress reporter
    async fn send_multipart(
        &self,
        path: &Path,
        kind: UploadKind,
        status: &StatusMessage,
        settings: &Settings,
    ) -> Result<(), BotError> {
        let name = file_name(path);
        let size = tokio::fs::metadata(path).await?.len();

        let file = File::open(path).await?;
        let sent = Arc::new(AtomicU64::new(0));
        let counter = sent.clone();
        let stream = ReaderStream::new(file).inspect_ok(move |chunk| {
            counter.fetch_add(chunk.len() as u64, Ordering::Relaxed);
        });

        let part = reqwest::multipart::Part::stream_with_length(
            reqwest::Body::wrap_stream(stream),
            size,
        )
        .file_name(name.clone())
        .mime_str("application/octet-stream")?;

        let mut form = reqwest::multipart::Form::new()
            .text("chat_id", status.chat_id().to_string())
            .text("caption", caption(&name, size))
            .part(kind.field(), part);
        if kind == UploadKind::Video {
            form = form.text("supports_streaming", "true");
        }

        let url = format!(
            "https://api.telegram.org/bot{}/{}",
            self.bot.token(),
            kind.api_method()
        );

        let reporter = tokio::spawn(report_progress(
            status.clone(),
            sent,
            size,
            name.clone(),
            settings.progress_interval,
            settings.progress_bar_len,
        ));
        let started = Instant::now();

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .send()
            .await;
        reporter.abort();

        let response = response?;
        if !response.status().is_success() {
            return Err(BotError::Message(format!(
                "upload rejected: HTTP {}",
                response.status()
            )));
        }
        let body: serde_json::Value = response.json().await?;
        if !body.get("ok").and_then(|v| v.as_bool()).unwrap_or(false) {
            let description = body
                .get("description")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error");
            return Err(BotError::Message(format!("upload rejected: {}", description)));
        }

        let elapsed = started.elapsed();
        let avg = (size as f64 / elapsed.as_secs_f64().max(1e-6)) as u64;
        status
            .edit(&format!(
                "{} Upload complete: `{}`\n\nProgress: 100% `{}`\nAvg speed: `{}/s` | Time: `{}`",
                emoji::SUCCESS,
                name,
                progress_bar(100.0, settings.progress_bar_len),
                format_size(avg),
                format_hms(elapsed.as_secs())
            ))
            .await;

        Ok(())
    }

    /// Plain teloxide send, no live progress
    async fn send_fallback(
        &self,
        path: &Path,
        kind: UploadKind,
        status: &StatusMessage,
    ) -> Result<(), BotError> {
        let name = file_name(path);
        let size = tokio::fs::metadata(path).await?.len();
        let cap = caption(&name, size);
        let input = InputFile::file(path.to_path_buf());
        let chat_id = status.chat_id();

        match kind {
            UploadKind::Video => {
                self.bot
                    .send_video(chat_id, input)
                    .caption(cap)
                    .supports_streaming(true)
                    .await?;
            }
            UploadKind::Photo => {
                self.bot.send_photo(chat_id, input).caption(cap).await?;
            }
            UploadKind::Audio => {
                self.bot.send_audio(chat_id, input).caption(cap).await?;
            }
            UploadKind::Document => {
                self.bot.send_document(chat_id, input).caption(cap).await?;
            }
        }

        status
            .edit(&format!(
                "{} Uploaded: `{}`\nSize: `{}`",
                emoji::SUCCESS,
                name,
                format_size(size)
            ))
            .await;

        Ok(())
    }
}

/// Periodic status edits while the multipart body streams out
async fn report_progress(
    status: StatusMessage,
    sent: Arc<AtomicU64>,
    total: u64,
    name: String,
    interval: Duration,
    bar_len: usize,
) {
    let started = Instant::now();
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let uploaded = sent.load(Ordering::Relaxed);
        let pct = if total > 0 {
            uploaded as f64 * 100.0 / total as f64
        } else {
            0.0
        };
        let elapsed = started.elapsed().as_secs_f64().max(1e-4);
        let speed = (uploaded as f64 / elapsed) as u64;
        let eta = if speed > 0 {
            total.saturating_sub(uploaded) / speed
        } else {
            0
        };

        status
            .edit(&format!(
                "{} Uploading: `{}`\n\nProgress: {:5.1}% `{}`\n{} Speed: `{}/s` | ETA: `{}`",
                emoji::UPLOAD,
                name,
                pct,
                progress_bar(pct, bar_len),
                emoji::SPEED,
                format_size(speed),
                format_hms(eta)
            ))
            .await;
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string())
}

fn caption(name: &str, size: u64) -> String {
    format!("{}\n{}", name, format_size(size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_upload_kind() {
        assert_eq!(UploadKind::detect(Path::new("a.mp4")), UploadKind::Video);
        assert_eq!(UploadKind::detect(Path::new("a.mkv")), UploadKind::Video);
        assert_eq!(UploadKind::detect(Path::new("a.webm")), UploadKind::Video);
        assert_eq!(UploadKind::detect(Path::new("a.jpg")), UploadKind::Photo);
        assert_eq!(UploadKind::detect(Path::new("a.png")), UploadKind::Photo);
        assert_eq!(UploadKind::detect(Path::new("a.mp3")), UploadKind::Audio);
        assert_eq!(UploadKind::detect(Path::new("a.flac")), UploadKind::Audio);
        assert_eq!(UploadKind::detect(Path::new("a.zip")), UploadKind::Document);
        assert_eq!(UploadKind::detect(Path::new("noext")), UploadKind::Document);
    }

    #[test]
    fn test_api_method_and_field_agree() {
        for kind in [
            UploadKind::Video,
            UploadKind::Photo,
            UploadKind::Audio,
            UploadKind::Document,
        ] {
            // sendVideo pairs with the "video" field, and so on
            let method = kind.api_method().strip_prefix("send").unwrap();
            assert_eq!(method.to_lowercase(), kind.field());
        }
    }

    #[test]
    fn test_caption() {
        assert_eq!(caption("movie.mkv", 1024), "movie.mkv\n1.00 KB");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(Path::new("/data/downloads/a/movie.mkv")), "movie.mkv");
        assert_eq!(file_name(Path::new("/")), "file");
    }
}
