//! Server state shared with the bot side

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Shared counter of currently running download jobs
///
/// The bot side increments it when a job starts and decrements it when
/// the job's worker exits, on every exit path.
#[derive(Debug, Clone, Default)]
pub struct JobGauge(Arc<AtomicUsize>);

impl JobGauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        // saturating: a stray double-decrement must not wrap
        let _ = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
                Some(v.saturating_sub(1))
            });
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

/// State behind the keep-alive endpoints
#[derive(Clone)]
pub struct ServerState {
    started_at: DateTime<Utc>,
    jobs: JobGauge,
}

impl ServerState {
    pub fn new(jobs: JobGauge) -> Self {
        Self {
            started_at: Utc::now(),
            jobs,
        }
    }

    /// Seconds since the process came up
    pub fn uptime_secs(&self) -> i64 {
        Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
            .max(0)
    }

    /// Number of currently running download jobs
    pub fn active_jobs(&self) -> usize {
        self.jobs.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_gauge() {
        let gauge = JobGauge::new();
        assert_eq!(gauge.get(), 0);
        gauge.inc();
        gauge.inc();
        assert_eq!(gauge.get(), 2);
        gauge.dec();
        assert_eq!(gauge.get(), 1);
    }

    #[test]
    fn test_job_gauge_never_wraps() {
        let gauge = JobGauge::new();
        gauge.dec();
        assert_eq!(gauge.get(), 0);
    }

    #[test]
    fn test_gauge_shared_between_clones() {
        let gauge = JobGauge::new();
        let other = gauge.clone();
        gauge.inc();
        assert_eq!(other.get(), 1);
    }

    #[test]
    fn test_server_state() {
        let gauge = JobGauge::new();
        let state = ServerState::new(gauge.clone());
        assert_eq!(state.active_jobs(), 0);
        gauge.inc();
        assert_eq!(state.active_jobs(), 1);
        assert!(state.uptime_secs() >= 0);
    }
}
