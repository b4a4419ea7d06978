//! Download job bookkeeping

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use keepalive::JobGauge;
use teloxide::types::{ChatId, MessageId, UserId};

use crate::constants::JOB_ID_LEN;

/// One link submission and its lifecycle flags
#[derive(Debug, Clone)]
pub struct Job {
    /// Short hex id shown to the user
    pub id: String,
    /// Chat the status updates go to
    pub chat_id: ChatId,
    /// User who submitted the link
    pub user_id: UserId,
    /// The Mega link being mirrored
    pub url: String,
    /// Per-job download directory under the download root
    pub download_dir: PathBuf,
    /// The editable status message
    pub status_message: MessageId,
    pub started_at: DateTime<Utc>,
    pub cancel_requested: bool,
    pub done: bool,
}

/// Shared registry of all jobs, alive and finished
///
/// Jobs stay in the registry after completion so /status can show them;
/// the map only lives as long as the process (as does everything else
/// about a job).
#[derive(Clone)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<String, Job>>>,
    gauge: JobGauge,
}

impl JobRegistry {
    pub fn new(gauge: JobGauge) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            gauge,
        }
    }

    /// Register a new job and bump the active gauge
    pub fn insert(&self, job: Job) {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        jobs.insert(job.id.clone(), job);
        self.gauge.inc();
    }

    pub fn get(&self, id: &str) -> Option<Job> {
        let jobs = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        jobs.get(id).cloned()
    }

    /// All jobs, oldest first, for /status
    pub fn snapshot(&self) -> Vec<Job> {
        let jobs = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        let mut all: Vec<Job> = jobs.values().cloned().collect();
        all.sort_by_key(|j| j.started_at);
        all
    }

    /// Flag a job for cancellation
    ///
    /// Returns `false` when the id is unknown or the job already finished.
    pub fn request_cancel(&self, id: &str) -> bool {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        match jobs.get_mut(id) {
            Some(job) if !job.done => {
                job.cancel_requested = true;
                true
            }
            _ => false,
        }
    }

    pub fn cancel_requested(&self, id: &str) -> bool {
        let jobs = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        jobs.get(id).map(|j| j.cancel_requested).unwrap_or(false)
    }

    /// Mark a job finished and release its slot on the gauge
    pub fn mark_done(&self, id: &str) {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        if let Some(job) = jobs.get_mut(id) {
            if !job.done {
                job.done = true;
                self.gauge.dec();
            }
        }
    }
}

/// Generate a short job id
pub fn new_job_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(JOB_ID_LEN);
    id
}

/// Remove top-level entries of the download root older than the cutoff
///
/// Used by /clear and the hourly sweeper. Returns the number of entries
/// removed; unreadable entries are skipped.
pub async fn prune_stale(root: &Path, max_age_hours: i64) -> std::io::Result<usize> {
    let cutoff = Utc::now() - Duration::hours(max_age_hours);
    let mut removed = 0;

    let mut entries = tokio::fs::read_dir(root).await?;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        let modified = match entry.metadata().await.and_then(|m| m.modified()) {
            Ok(t) => DateTime::<Utc>::from(t),
            Err(e) => {
                tracing::debug!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        if modified >= cutoff {
            continue;
        }

        let result = if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
            tokio::fs::remove_dir_all(&path).await
        } else {
            tokio::fs::remove_file(&path).await
        };

        match result {
            Ok(()) => {
                tracing::info!("Pruned stale download: {}", path.display());
                removed += 1;
            }
            Err(e) => tracing::debug!("Failed to remove {}: {}", path.display(), e),
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_job(id: &str) -> Job {
        Job {
            id: id.to_string(),
            chat_id: ChatId(1),
            user_id: UserId(2),
            url: "https://mega.nz/file/AbC123#dEf456".to_string(),
            download_dir: PathBuf::from("/tmp/test"),
            status_message: MessageId(3),
            started_at: Utc::now(),
            cancel_requested: false,
            done: false,
        }
    }

    #[test]
    fn test_registry_lifecycle() {
        let gauge = JobGauge::new();
        let registry = JobRegistry::new(gauge.clone());

        registry.insert(test_job("aaaa1111"));
        assert_eq!(gauge.get(), 1);
        assert!(registry.get("aaaa1111").is_some());
        assert!(registry.get("bbbb2222").is_none());

        registry.mark_done("aaaa1111");
        assert_eq!(gauge.get(), 0);
        assert!(registry.get("aaaa1111").unwrap().done);

        // Marking done twice must not double-decrement
        registry.mark_done("aaaa1111");
        assert_eq!(gauge.get(), 0);
    }

    #[test]
    fn test_cancel_semantics() {
        let registry = JobRegistry::new(JobGauge::new());
        registry.insert(test_job("aaaa1111"));

        assert!(!registry.cancel_requested("aaaa1111"));
        assert!(registry.request_cancel("aaaa1111"));
        assert!(registry.cancel_requested("aaaa1111"));

        // Unknown and finished jobs cannot be cancelled
        assert!(!registry.request_cancel("bbbb2222"));
        registry.mark_done("aaaa1111");
        assert!(!registry.request_cancel("aaaa1111"));
    }

    #[test]
    fn test_snapshot_sorted() {
        let registry = JobRegistry::new(JobGauge::new());
        let mut first = test_job("aaaa1111");
        first.started_at = Utc::now() - Duration::minutes(5);
        registry.insert(test_job("bbbb2222"));
        registry.insert(first);

        let all = registry.snapshot();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "aaaa1111");
    }

    #[test]
    fn test_new_job_id() {
        let id = new_job_id();
        assert!(crate::utils::is_valid_job_id(&id));
        assert_ne!(new_job_id(), new_job_id());
    }

    #[tokio::test]
    async fn test_prune_stale() {
        let root = std::env::temp_dir().join(format!("prune_test_{}", new_job_id()));
        tokio::fs::create_dir_all(root.join("user_1_aaaa1111"))
            .await
            .unwrap();
        tokio::fs::write(root.join("stray.bin"), b"x").await.unwrap();

        // A generous cutoff keeps fresh entries
        assert_eq!(prune_stale(&root, 6).await.unwrap(), 0);

        // A zero-hour cutoff removes everything already on disk
        assert_eq!(prune_stale(&root, 0).await.unwrap(), 2);
        assert_eq!(prune_stale(&root, 0).await.unwrap(), 0);

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }
}
