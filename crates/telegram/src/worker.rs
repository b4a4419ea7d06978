//! Per-file streaming worker
//!
//! One worker per job. The download runs in its own task while the
//! worker watches the job directory; every file that appears and
//! settles is announced, uploaded, and deleted, so folder links stream
//! file by file instead of occupying disk all at once.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mega::{MegaClient, MegaLink};
use teloxide::prelude::*;

use crate::constants::{emoji, MAX_UPLOAD_BYTES};
use crate::error::UserMessage;
use crate::handlers::StatusMessage;
use crate::jobs::JobRegistry;
use crate::upload::{UploadKind, Uploader};
use crate::utils::{format_hms, format_size};
use crate::Settings;

pub async fn run(
    bot: Bot,
    settings: Settings,
    client: MegaClient,
    registry: JobRegistry,
    job_id: String,
) {
    let job = match registry.get(&job_id) {
        Some(job) => job,
        None => return,
    };
    let status = StatusMessage::new(bot.clone(), job.chat_id, job.status_message);

    let link = match MegaLink::find(&job.url) {
        Some(link) => link,
        None => {
            // The dispatch filter validated the link, so this is unreachable
            // in practice
            registry.mark_done(&job_id);
            return;
        }
    };

    if let Err(e) = reset_dir(&job.download_dir).await {
        tracing::error!("Failed to prepare {}: {}", job.download_dir.display(), e);
        status
            .edit(&format!(
                "{} Job `{}` failed: could not prepare download directory.",
                emoji::ERROR,
                job_id
            ))
            .await;
        registry.mark_done(&job_id);
        return;
    }

    let download = {
        let client = client.clone();
        let link = link.clone();
        let dir = job.download_dir.clone();
        tokio::spawn(async move { client.download_with_retry(&link, &dir).await })
    };

    let uploader = Uploader::new(bot.clone());
    let mut processed: HashSet<PathBuf> = HashSet::new();
    let mut uploaded = 0usize;
    let cancelled = || registry.cancel_requested(&job_id);

    'watch: loop {
        if cancelled() {
            break;
        }

        let finished = download.is_finished();
        let mut pending: Vec<PathBuf> = scan_files(&job.download_dir)
            .await
            .into_iter()
            .filter(|p| !processed.contains(p))
            .collect();

        if pending.is_empty() {
            if finished {
                break;
            }
            tokio::time::sleep(settings.poll_interval).await;
            continue;
        }

        pending.sort();
        for path in pending {
            if cancelled() {
                break 'watch;
            }

            if !wait_for_stable(&path, settings.stable_window, settings.poll_interval, &cancelled)
                .await
            {
                // Cancelled or the file disappeared under us
                processed.insert(path);
                continue;
            }
            processed.insert(path.clone());

            let size = match tokio::fs::metadata(&path).await {
                Ok(meta) => meta.len(),
                Err(e) => {
                    tracing::debug!("Stat failed for {}: {}", path.display(), e);
                    continue;
                }
            };
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let mut text = format!(
                "{} Downloaded: `{}`\n{} Size: `{}`\n",
                emoji::SUCCESS,
                name,
                emoji::PACKAGE,
                format_size(size)
            );
            if UploadKind::detect(&path) == UploadKind::Video {
                if let Some(duration) = mega::media::probe_duration(&path).await {
                    text.push_str(&format!(
                        "{} Duration: `{}`\n",
                        emoji::CLOCK,
                        format_hms(duration)
                    ));
                }
            }
            status.edit(&text).await;

            if size > MAX_UPLOAD_BYTES {
                // Left on disk for manual handling
                status
                    .edit(&format!(
                        "{}\n{} File exceeds the Telegram limit ({}). Skipping upload.\nLocal path: `{}`",
                        text,
                        emoji::WARNING,
                        format_size(MAX_UPLOAD_BYTES),
                        path.display()
                    ))
                    .await;
                continue;
            }

            match uploader.send_file(&path, &status, &settings).await {
                Ok(()) => uploaded += 1,
                Err(err) => {
                    tracing::error!("Upload failed for {}: {}", path.display(), err);
                    let _ = bot
                        .send_message(
                            job.chat_id,
                            format!("{} (file: `{}`)", err.user_message(), name),
                        )
                        .await;
                }
            }

            if let Err(e) = tokio::fs::remove_file(&path).await {
                tracing::debug!("Failed to remove {}: {}", path.display(), e);
            }
        }
    }

    let was_cancelled = cancelled();
    registry.mark_done(&job_id);

    if was_cancelled {
        status
            .edit(&format!("{} Job `{}` cancelled.", emoji::WARNING, job_id))
            .await;
    } else {
        match download.await {
            Ok(Ok(())) => {
                if processed.is_empty() {
                    status
                        .edit(&format!(
                            "{} Job `{}` finished — nothing to upload.",
                            emoji::SUCCESS,
                            job_id
                        ))
                        .await;
                }
                tracing::info!("Job {} done, {} file(s) uploaded", job_id, uploaded);
            }
            Ok(Err(err)) => {
                tracing::error!("Job {} download failed: {}", job_id, err);
                status
                    .edit(&format!(
                        "{} Job `{}` download failed: {}",
                        emoji::ERROR,
                        job_id,
                        err
                    ))
                    .await;
            }
            Err(err) => tracing::error!("Job {} download task panicked: {}", job_id, err),
        }
    }

    cleanup_dir(&job.download_dir).await;
}

/// Recreate the job directory from scratch (auto-overwrite)
async fn reset_dir(dir: &Path) -> std::io::Result<()> {
    if tokio::fs::metadata(dir).await.is_ok() {
        tokio::fs::remove_dir_all(dir).await?;
    }
    tokio::fs::create_dir_all(dir).await
}

/// Remove the job directory if nothing is left in it
async fn cleanup_dir(dir: &Path) {
    let empty = match tokio::fs::read_dir(dir).await {
        Ok(mut entries) => matches!(entries.next_entry().await, Ok(None)),
        Err(_) => false,
    };
    if empty {
        if let Err(e) = tokio::fs::remove_dir(dir).await {
            tracing::debug!("Failed to remove {}: {}", dir.display(), e);
        } else {
            tracing::info!("Cleaned up: {}", dir.display());
        }
    }
}

/// Collect all regular files below `root`
async fn scan_files(root: &Path) -> Vec<PathBuf> {
    let mut stack = vec![root.to_path_buf()];
    let mut files = Vec::new();

    while let Some(dir) = stack.pop() {
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(_) => continue,
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            match entry.file_type().await {
                Ok(ft) if ft.is_dir() => stack.push(entry.path()),
                Ok(_) => files.push(entry.path()),
                Err(_) => {}
            }
        }
    }

    files
}

/// Wait until the file's size is unchanged for the stability window
///
/// Returns `false` when cancelled or when the file disappears.
async fn wait_for_stable(
    path: &Path,
    window: Duration,
    poll: Duration,
    cancelled: &impl Fn() -> bool,
) -> bool {
    let mut last_size: Option<u64> = None;
    let mut unchanged_for = Duration::ZERO;

    loop {
        if cancelled() {
            return false;
        }

        let size = match tokio::fs::metadata(path).await {
            Ok(meta) => meta.len(),
            Err(_) => return false,
        };

        if last_size == Some(size) {
            unchanged_for += poll;
            if unchanged_for >= window {
                return true;
            }
        } else {
            last_size = Some(size);
            unchanged_for = Duration::ZERO;
        }

        tokio::time::sleep(poll).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("worker_test_{}_{}", tag, crate::jobs::new_job_id()))
    }

    #[tokio::test]
    async fn test_reset_dir_clears_content() {
        let root = temp_root("reset");
        tokio::fs::create_dir_all(root.join("old")).await.unwrap();
        tokio::fs::write(root.join("old/leftover.bin"), b"x")
            .await
            .unwrap();

        reset_dir(&root).await.unwrap();
        assert!(scan_files(&root).await.is_empty());

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn test_scan_files_recurses() {
        let root = temp_root("scan");
        tokio::fs::create_dir_all(root.join("a/b")).await.unwrap();
        tokio::fs::write(root.join("top.bin"), b"1").await.unwrap();
        tokio::fs::write(root.join("a/mid.bin"), b"2").await.unwrap();
        tokio::fs::write(root.join("a/b/deep.bin"), b"3").await.unwrap();

        let mut files = scan_files(&root).await;
        files.sort();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["deep.bin", "mid.bin", "top.bin"]);

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn test_scan_files_missing_root() {
        assert!(scan_files(Path::new("/nonexistent/worker_test")).await.is_empty());
    }

    #[tokio::test]
    async fn test_wait_for_stable_settles() {
        let root = temp_root("stable");
        tokio::fs::create_dir_all(&root).await.unwrap();
        let path = root.join("file.bin");
        tokio::fs::write(&path, b"stable").await.unwrap();

        let ok = wait_for_stable(
            &path,
            Duration::from_millis(20),
            Duration::from_millis(10),
            &|| false,
        )
        .await;
        assert!(ok);

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn test_wait_for_stable_cancel() {
        let ok = wait_for_stable(
            Path::new("/nonexistent/file.bin"),
            Duration::from_millis(20),
            Duration::from_millis(10),
            &|| true,
        )
        .await;
        assert!(!ok);
    }

    #[tokio::test]
    async fn test_wait_for_stable_missing_file() {
        let ok = wait_for_stable(
            Path::new("/nonexistent/file.bin"),
            Duration::from_millis(20),
            Duration::from_millis(10),
            &|| false,
        )
        .await;
        assert!(!ok);
    }
}
